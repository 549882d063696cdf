/// Parse a 1-based page selection such as `"1,3-5"` into sorted, distinct
/// 0-based page indices.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, String> {
    let page_number = |text: &str| -> Result<usize, String> {
        let page: usize = text
            .trim()
            .parse()
            .map_err(|_| format!("invalid page number: '{}'", text.trim()))?;
        if page == 0 {
            return Err("page 0 is invalid (pages start at 1)".to_string());
        }
        if page > page_count {
            return Err(format!(
                "page {page} exceeds document page count ({page_count})"
            ));
        }
        Ok(page)
    };

    let mut pages = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (page_number(start)?, page_number(end)?);
                if start > end {
                    return Err(format!("descending page range: '{part}'"));
                }
                pages.extend(start - 1..end);
            }
            None => pages.push(page_number(part)? - 1),
        }
    }
    if pages.is_empty() {
        return Err(format!("no pages selected by '{input}'"));
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pages_and_ranges() {
        assert_eq!(parse_page_range("1", 5), Ok(vec![0]));
        assert_eq!(parse_page_range("1,3-5", 5), Ok(vec![0, 2, 3, 4]));
        assert_eq!(parse_page_range(" 2 , 2-3 ", 5), Ok(vec![1, 2]));
    }

    #[test]
    fn out_of_range_pages() {
        assert!(parse_page_range("0", 5).unwrap_err().contains("page 0"));
        assert!(parse_page_range("6", 5).unwrap_err().contains("exceeds"));
        assert!(parse_page_range("4-9", 5).is_err());
    }

    #[test]
    fn malformed_input() {
        assert!(parse_page_range("a", 5).unwrap_err().contains("invalid page number"));
        assert!(parse_page_range("3-1", 5).unwrap_err().contains("descending"));
        assert!(parse_page_range(",", 5).is_err());
    }
}
