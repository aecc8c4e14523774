//! Loading documents and user ratings into entity sets.
use crate::{EntitySets, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// What to do with a rating row that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Skip the row and count it.
    Skip,
    /// Stop at the first bad row.
    Fail,
}

impl Default for RowPolicy {
    fn default() -> Self {
        RowPolicy::Skip
    }
}

/// Movie IDs rated per user.
#[derive(Debug, Clone, Default)]
pub struct Ratings {
    pub users: EntitySets<u32, u32>,
    /// Rows dropped under [`RowPolicy::Skip`].
    pub skipped: usize,
}

impl Ratings {
    /// Number of distinct movie IDs over all users.
    pub fn n_items(&self) -> usize {
        let mut items: Vec<u32> = self.users.values().flatten().copied().collect();
        items.sort_unstable();
        items.dedup();
        items.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub text: String,
}

fn parse_id(field: Option<&[u8]>, column: &str) -> std::result::Result<u32, String> {
    let raw = field.ok_or_else(|| format!("missing {} column", column))?;
    let raw = std::str::from_utf8(raw).map_err(|_| format!("{} is not valid UTF-8", column))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("{} {:?} is not a non-negative integer", column, raw))
}

/// Read a `userId,movieId[,...]` table with a header row. Extra columns are ignored.
///
/// Fields are decoded per row, so under [`RowPolicy::Skip`] a row with bad bytes is
/// skipped like any other malformed row.
pub fn read_ratings<R: Read>(reader: R, policy: RowPolicy) -> Result<Ratings> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut ratings = Ratings::default();
    for record in rdr.byte_records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let parsed = parse_id(record.get(0), "userId")
            .and_then(|user| parse_id(record.get(1), "movieId").map(|movie| (user, movie)));

        match (parsed, policy) {
            (Ok((user, movie)), _) => {
                ratings.users.entry(user).or_default().insert(movie);
            }
            (Err(reason), RowPolicy::Skip) => {
                warn!(line, %reason, "skipping rating row");
                ratings.skipped += 1;
            }
            (Err(reason), RowPolicy::Fail) => return Err(Error::MalformedRow { line, reason }),
        }
    }
    info!(
        users = ratings.users.len(),
        skipped = ratings.skipped,
        "loaded ratings"
    );
    Ok(ratings)
}

pub fn load_ratings<P: AsRef<Path>>(path: P, policy: RowPolicy) -> Result<Ratings> {
    let f = File::open(path.as_ref())?;
    read_ratings(f, policy)
}

/// Read text documents, named by their file name.
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>> {
    paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            let text = fs::read_to_string(p)?;
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string());
            info!(document = %name, chars = text.chars().count(), "loaded document");
            Ok(Document { name, text })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    const CSV: &str = "userId,movieId,rating,timestamp\n\
                       1,31,2.5,1260759144\n\
                       1,1029,3.0,1260759179\n\
                       2,31,4.0,1260759182\n\
                       1,31,4.0,1260759185\n";

    #[test]
    fn test_read_ratings() {
        let ratings = read_ratings(CSV.as_bytes(), RowPolicy::Fail).unwrap();
        assert_eq!(ratings.users.len(), 2);
        assert_eq!(ratings.users[&1].len(), 2);
        assert!(ratings.users[&2].contains(&31));
        assert_eq!(ratings.skipped, 0);
        assert_eq!(ratings.n_items(), 2);
    }

    #[test]
    fn test_two_columns() {
        let ratings = read_ratings("userId,movieId\n7, 9\n".as_bytes(), RowPolicy::Fail).unwrap();
        assert!(ratings.users[&7].contains(&9));
    }

    #[test]
    fn test_skip_malformed() {
        let data = "userId,movieId\n1,2\nx,3\n4\n5,-1\n6,7\n";
        let ratings = read_ratings(data.as_bytes(), RowPolicy::Skip).unwrap();
        assert_eq!(ratings.skipped, 3);
        assert_eq!(ratings.users.keys().copied().collect::<Vec<_>>(), vec![1, 6]);
    }

    #[test]
    fn test_skip_bad_bytes() {
        let data: &[u8] = b"userId,movieId\n1,2\n\xff\xfe,3\n6,7\n";
        let ratings = read_ratings(data, RowPolicy::Skip).unwrap();
        assert_eq!(ratings.skipped, 1);
        assert_eq!(ratings.users.keys().copied().collect::<Vec<_>>(), vec![1, 6]);

        match read_ratings(data, RowPolicy::Fail) {
            Err(Error::MalformedRow { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fail_malformed() {
        let data = "userId,movieId\n1,2\n3,abc\n";
        match read_ratings(data.as_bytes(), RowPolicy::Fail) {
            Err(Error::MalformedRow { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let ratings_path = dir.path().join("ratings.csv");
        File::create(&ratings_path)
            .unwrap()
            .write_all(CSV.as_bytes())
            .unwrap();
        let ratings = load_ratings(&ratings_path, RowPolicy::Skip).unwrap();
        assert_eq!(ratings.users.len(), 2);

        let doc = dir.path().join("D1.txt");
        fs::write(&doc, "Hello World").unwrap();
        let docs = load_documents(&[&doc]).unwrap();
        assert_eq!(docs[0].name, "D1.txt");
        assert_eq!(docs[0].text, "Hello World");

        assert!(load_documents(&[dir.path().join("missing.txt")]).is_err());
        assert!(load_ratings(dir.path().join("missing.csv"), RowPolicy::Skip).is_err());
    }
}
