//! Result writer.
//!
//! Serializes records as CSV (RFC 4180 quoting, CRLF line endings).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Header of sequential result files.
pub const SEQUENTIAL_HEADER: &[&str] = &["db", "op", "payload_size", "index", "latency_ms", "key"];

/// Header of concurrent result files.
pub const CONCURRENT_HEADER: &[&str] = &[
    "db",
    "op",
    "payload_size",
    "index",
    "latency_ms",
    "key",
    "thread",
];

/// Path of the result file for one run.
///
/// `threads` is `None` for sequential runs.
pub fn output_path(dir: &Path, backend: &str, payload_size: usize, threads: Option<usize>) -> PathBuf {
    let file = match threads {
        None => format!("{backend}_seq_{payload_size}.csv"),
        Some(threads) => format!("{backend}_concurrency_{payload_size}_th{threads}.csv"),
    };
    dir.join(file)
}

/// Write `header` and `rows` to `path`, creating parent directories and
/// truncating any existing file.
pub fn write_csv<I, R, S>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, header.iter())?;
    for row in rows {
        write_row(&mut out, row)?;
    }
    out.flush()?;
    Ok(())
}

fn write_row<W: Write, R, S>(out: &mut W, row: R) -> std::io::Result<()>
where
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in row.into_iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(escape_field(field.as_ref()).as_bytes())?;
    }
    out.write_all(b"\r\n")
}

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let dir = Path::new("results");
        assert_eq!(
            output_path(dir, "sqlite", 256, None),
            PathBuf::from("results/sqlite_seq_256.csv")
        );
        assert_eq!(
            output_path(dir, "redis", 1024, Some(8)),
            PathBuf::from("results/redis_concurrency_1024_th8.csv")
        );
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_zero_rows_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/empty.csv");

        write_csv(&path, SEQUENTIAL_HEADER, Vec::<Vec<String>>::new()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "db,op,payload_size,index,latency_ms,key\r\n");
    }

    #[test]
    fn test_rerun_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &["a"], vec![vec!["1"], vec!["2"]]).unwrap();
        write_csv(&path, &["a"], vec![vec!["3"]]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a\r\n3\r\n");
    }
}
