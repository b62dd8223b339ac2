/// Greedy word wrap by measured width. Explicit newlines always break; a
/// single word wider than `max_width` gets a line of its own.
pub fn wrap_to_width<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Top edge of a block of `block_height` centered on `anchor * canvas_height`,
/// kept inside the canvas.
pub fn block_top(canvas_height: u32, block_height: f32, anchor: f32) -> f32 {
    let canvas_height = canvas_height as f32;
    let top = canvas_height * anchor - block_height / 2.0;
    top.clamp(0.0, (canvas_height - block_height).max(0.0))
}
