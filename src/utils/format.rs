use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// `1 class`, `2 classes`.
pub fn pluralize(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Create a simple ASCII progress bar for a percentage in `0..=100`.
pub fn progress_bar(percentage: u32, width: usize) -> String {
    let ratio = (percentage.min(100) as f64) / 100.0;
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Truncate or pad to exactly `width` terminal columns.
pub fn fit_width(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if s.width() <= width {
        return format!("{}{}", s, " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_on_count() {
        assert_eq!(pluralize(1, "class", "classes"), "1 class");
        assert_eq!(pluralize(2, "class", "classes"), "2 classes");
        assert_eq!(pluralize(0, "class", "classes"), "0 classes");
    }

    #[test]
    fn bar_is_proportional() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(250, 4), "████");
    }

    #[test]
    fn fits_names_to_columns() {
        assert_eq!(fit_width("OS", 4), "OS  ");
        assert_eq!(fit_width("Compilers", 5), "Comp…");
        assert_eq!(fit_width("Compilers", 5).width(), 5);
        assert_eq!(fit_width("Compilers", 1), "…");
        assert_eq!(fit_width("OS", 0), "");
    }
}
