use crate::format::RecordFormat;
use crate::{Extraction, ParseError, RecordMetadata};
use tracing::{debug, trace};

/// Splits raw sensor text into record blocks and pulls one positional field
/// out of each.
///
/// Extraction never fails: blocks with too few delimiters or an empty field
/// are skipped, and input without any marker yields an empty [`Extraction`].
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    format: RecordFormat,
}

impl RecordExtractor {
    pub fn new(format: RecordFormat) -> Result<Self, ParseError> {
        format.validate()?;
        Ok(Self { format })
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        let blocks = split_blocks(raw, &self.format.marker);
        debug!("Found {} '{}' blocks", blocks.len(), self.format.marker);

        let mut records = Vec::new();

        for (block_idx, block) in blocks.iter().enumerate() {
            let timestamp = extract_timestamp(block, self.format.delimiter);
            let positions = delimiter_positions(block, self.format.delimiter);
            trace!(
                "Block {}: {} delimiters, timestamp '{}'",
                block_idx + 1,
                positions.len(),
                timestamp
            );

            let Some(slice) = slice_field(
                block,
                &positions,
                self.format.delimiter,
                self.format.start_index,
                self.format.end_index,
            ) else {
                debug!(
                    "Block {} skipped: {} delimiters, need more than {}",
                    block_idx + 1,
                    positions.len(),
                    self.format.end_index
                );
                continue;
            };

            if slice.trim().is_empty() {
                debug!("Block {} skipped: empty field", block_idx + 1);
                continue;
            }

            records.push(RecordMetadata {
                sequence_index: records.len() as u32 + 1,
                slice_text: slice.to_string(),
                timestamp,
                source_block: block.to_string(),
            });
        }

        let combined_stream = combine_slices(&records, self.format.delimiter);
        debug!("Accepted {} of {} blocks", records.len(), blocks.len());

        Extraction {
            combined_stream,
            accepted_count: records.len(),
            records,
        }
    }
}

/// Every maximal run of text starting at `marker` and ending before the next
/// marker or at end of input. Text before the first marker is ignored.
pub fn split_blocks<'a>(raw: &'a str, marker: &str) -> Vec<&'a str> {
    if marker.is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = raw.match_indices(marker).map(|(idx, _)| idx).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(raw.len());
            &raw[start..end]
        })
        .collect()
}

/// Text after the last delimiter, trimmed. Empty when the block has none.
pub fn extract_timestamp(block: &str, delimiter: char) -> String {
    block
        .rfind(delimiter)
        .map(|pos| block[pos + delimiter.len_utf8()..].trim().to_string())
        .unwrap_or_default()
}

/// Byte offsets of every delimiter in the block, in order.
pub fn delimiter_positions(block: &str, delimiter: char) -> Vec<usize> {
    block
        .char_indices()
        .filter(|&(_, c)| c == delimiter)
        .map(|(idx, _)| idx)
        .collect()
}

/// Text strictly between the `start_index`-th and `end_index`-th delimiter.
///
/// Requires strictly more than `end_index` delimiters; a block with exactly
/// `end_index + 1` is accepted.
pub fn slice_field<'a>(
    block: &'a str,
    positions: &[usize],
    delimiter: char,
    start_index: usize,
    end_index: usize,
) -> Option<&'a str> {
    if positions.len() <= end_index {
        return None;
    }

    let from = positions.get(start_index)? + delimiter.len_utf8();
    let to = positions[end_index];

    block.get(from..to)
}

/// `delimiter + join(slices, delimiter) + delimiter`, or empty.
fn combine_slices(records: &[RecordMetadata], delimiter: char) -> String {
    if records.is_empty() {
        return String::new();
    }

    let separator = delimiter.to_string();
    let joined = records
        .iter()
        .map(|r| r.slice_text.as_str())
        .collect::<Vec<_>>()
        .join(&separator);

    format!("{separator}{joined}{separator}")
}
