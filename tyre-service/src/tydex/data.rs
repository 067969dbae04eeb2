// MEASURDATA Rows
// Column-preserving substitution of channel values into data lines

use crate::channels::ChannelData;
use crate::tydex::document::ChannelDefinition;

/// Rewrite whitespace-delimited fields of `line` in place.
///
/// `value_at(ordinal)` gives the new text for the field at that position,
/// or `None` to keep it. Separators are copied as they are. A field that
/// held a negative number gets one extra leading space instead of
/// reusing the sign position.
pub fn substitute_fields(line: &str, mut value_at: impl FnMut(usize) -> Option<String>) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut rest = line;
    let mut ordinal = 0;

    loop {
        let separator = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..separator]);
        rest = &rest[separator..];
        if rest.is_empty() {
            break;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        match value_at(ordinal) {
            Some(value) => {
                if token.starts_with('-') {
                    out.push(' ');
                }
                out.push_str(&value);
            }
            None => out.push_str(token),
        }

        rest = &rest[end..];
        ordinal += 1;
    }

    out
}

/// Replace the single field at `ordinal`
pub fn replace_token_at(line: &str, ordinal: usize, value: &str) -> String {
    substitute_fields(line, |i| (i == ordinal).then(|| value.to_string()))
}

/// Regenerate one data line from row `row` of the channel data.
///
/// Fields for channels with no value at this row keep their template text.
pub fn generate_data_line(
    line: &str,
    channels: &[ChannelDefinition],
    data: &ChannelData,
    row: usize,
) -> String {
    substitute_fields(line, |ordinal| {
        let channel = channels.iter().find(|c| c.ordinal == ordinal)?;
        data.get(&channel.name)?.formatted(row)
    })
}

/// Replace the row count on a `**MEASURDATA <n>` sentinel.
///
/// Sentinels without a count are returned unchanged.
pub fn rewrite_row_count(sentinel: &str, max_rows: usize) -> String {
    match sentinel_count(sentinel) {
        Some(_) => replace_token_at(sentinel, 1, &max_rows.to_string()),
        None => sentinel.to_string(),
    }
}

/// Row count declared on a sentinel, if any
pub fn sentinel_count(sentinel: &str) -> Option<usize> {
    sentinel.split_whitespace().nth(1)?.parse().ok()
}
