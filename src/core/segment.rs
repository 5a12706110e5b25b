//! Reassembles layout-fragmented extractor output into clause candidates.

/// Characters that close a candidate when they end the buffer.
pub const SENTENCE_TERMINATORS: [char; 5] = ['.', '!', '?', ';', ':'];

/// Splits `raw_text` into paragraphs on blank lines (two or more consecutive
/// newlines) and merges the lines of each paragraph into candidates.
///
/// Lines are trimmed and appended to a buffer with a single space. The buffer
/// is flushed whenever it ends in a [`SENTENCE_TERMINATORS`] character and at
/// every paragraph end, so a candidate never spans a blank line. Lines that
/// hold only whitespace neither start nor extend a buffer and do not end a
/// paragraph.
pub fn segment(raw_text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut buffer = String::new();

    // `lines` 會去掉 "\r\n" 的 '\r'，所以空字串就代表連續兩個換行
    for line in raw_text.lines() {
        if line.is_empty() {
            flush(&mut buffer, &mut candidates);
            continue;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(line);

        if buffer.ends_with(SENTENCE_TERMINATORS) {
            flush(&mut buffer, &mut candidates);
        }
    }

    // 最後一段沒有結尾標點也要輸出
    flush(&mut buffer, &mut candidates);

    candidates
}

fn flush(buffer: &mut String, candidates: &mut Vec<String>) {
    let candidate = buffer.trim();
    if !candidate.is_empty() {
        candidates.push(candidate.to_string());
    }
    buffer.clear();
}
