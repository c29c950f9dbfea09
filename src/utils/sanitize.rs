//! Output filename helpers

/// Sanitize a filename component for safe filesystem usage
///
/// Replaces filesystem-unsafe characters with visually similar Unicode alternatives
/// so a playlist entry can never name a file outside the output directory.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' => '⧸',  // U+29F8 - Big Solidus
            '\\' => '⧹', // U+29F9 - Big Reverse Solidus
            ':' => '꞉',  // U+A789 - Modifier Letter Colon
            '*' => '⁎',  // U+204E - Low Asterisk
            '?' => '？', // U+FF1F - Fullwidth Question Mark
            '"' => '″',  // U+2033 - Double Prime
            '<' => '‹',  // U+2039 - Single Left Angle Quote
            '>' => '›',  // U+203A - Single Right Angle Quote
            '|' => '｜', // U+FF5C - Fullwidth Vertical Line
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File stem of a downloaded track: `<artist> - <title>`
pub fn output_stem(artist: &str, title: &str) -> String {
    format!("{} - {}", sanitize_filename(artist), sanitize_filename(title))
}
