use console::style;

use crate::wiki::{Page, WikiStructure};

/// Styled status lines for the terminal
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Label and value on one line, label dimmed
    pub fn field(&self, label: &str, value: &str) {
        println!("  {} {}", style(format!("{label}:")).dim(), value);
    }

    /// Print the wiki navigation tree, page files dimmed
    pub fn wiki_tree(&self, structure: &WikiStructure) {
        println!("{}", style(&structure.title).bold());
        for line in navigation_lines(&structure.pages) {
            println!("{line}");
        }
    }

    /// Markdown or other free text, printed as is
    pub fn body(&self, text: &str) {
        println!("{}", text.trim_end());
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn navigation_lines(pages: &[Page]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&Page, usize)> = pages.iter().rev().map(|p| (p, 0)).collect();

    while let Some((page, depth)) = stack.pop() {
        lines.push(format!(
            "{}- {} {}",
            "  ".repeat(depth + 1),
            page.title,
            style(format!("({})", page.file)).dim()
        ));
        stack.extend(page.pages.iter().rev().map(|child| (child, depth + 1)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_lines_indent_by_depth() {
        console::set_colors_enabled(false);
        let pages = vec![
            Page {
                title: "Intro".to_string(),
                file: "01.md".to_string(),
                pages: vec![Page::leaf("Setup", "01_01.md")],
            },
            Page::leaf("API", "02.md"),
        ];
        assert_eq!(
            navigation_lines(&pages),
            vec![
                "  - Intro (01.md)",
                "    - Setup (01_01.md)",
                "  - API (02.md)",
            ]
        );
    }
}
