// Delimited text import

use taxmatch_recon::{ReconError, Table, Value};

/// Parse delimited text into a table. The first record is the header.
pub fn import_bytes(source: &str, bytes: &[u8]) -> Result<Table, ReconError> {
    let content = decode_utf8(bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);
    log::debug!("'{source}': delimiter {:?}", delimiter as char);
    import_from_string(source, content, delimiter)
}

const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// Guess the field delimiter from the first non-blank lines of `content`.
///
/// Each candidate scores its header width times the number of sampled
/// records with that same width; a candidate that leaves the header as one
/// field is out. Ties go to the earlier candidate, and a comma is the
/// fallback when nothing qualifies.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    DELIMITER_CANDIDATES
        .iter()
        .filter_map(|&d| delimiter_score(&sample, d).map(|score| (d, score)))
        .fold(None, |best: Option<(u8, usize)>, (d, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((d, score)),
        })
        .map_or(b',', |(d, _)| d)
}

fn delimiter_score(sample: &str, delimiter: u8) -> Option<usize> {
    let widths: Vec<usize> = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes())
        .records()
        .map_while(Result::ok)
        .map(|r| r.len())
        .collect();
    let header = *widths.first()?;
    if header < 2 {
        return None;
    }
    Some(header * widths.iter().filter(|&&w| w == header).count())
}

/// UTF-8 if valid, otherwise Windows-1252 (common for Excel-exported CSVs).
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn import_from_string(source: &str, content: &str, delimiter: u8) -> Result<Table, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let unparseable = |e: csv::Error| ReconError::Unparseable {
        source: source.into(),
        message: e.to_string(),
    };

    let headers = reader.headers().map_err(unparseable)?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReconError::Unparseable {
            source: source.into(),
            message: "no header row".into(),
        });
    }

    let mut table = Table::new(crate::header_names(headers.iter()));

    // Records with only empty fields stay as rows of `Empty` cells
    for result in reader.records() {
        let record = result.map_err(unparseable)?;
        table.push_row(
            record
                .iter()
                .map(|f| if f.is_empty() { Value::Empty } else { Value::text(f) })
                .collect(),
        );
    }

    Ok(table)
}
