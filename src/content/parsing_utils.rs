use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::str::Lines;

use lazy_static::lazy_static;
use markdown::Options;
use regex::Regex;

use crate::text_utils::parse_date_time;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PostHeader {
    pub id: String,
    pub date: NaiveDateTime,
    pub author: String,
    pub tags: Vec<String>,
}

/// Header of a markdown post
/// ```text
/// [ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
/// [DATE]: # (2022-04-02 12:05:00.000)
/// [AUTHOR]: # (daniel)
/// [TAGS]: # (rust web)
/// ```
/// optionally wrapped in an HTML comment block.
pub fn parse_post_header<'a>(file_name: &Path, lines: Lines<'a>) -> io::Result<(PostHeader, Lines<'a>, Option<&'a str>)> {
    let mut id: String = "".to_string();
    let mut date: String = "".to_string();
    let mut author: String = "".to_string();
    let mut tags: String = "".to_string();

    let mut lines = lines;
    let mut maybe_line = lines.next();

    // Skip optional HTML comment in the beginning
    let mut start_with_comment = false;

    while let Some(line) = maybe_line {
        let line = line.trim();

        // Empty lines are ok
        if line.is_empty() {
            maybe_line = lines.next();
            continue;
        }

        if line == "<!--" {
            maybe_line = lines.next();
            start_with_comment = true;
        }
        break;
    }

    while let Some(line) = maybe_line {
        if line.trim().is_empty() {
            maybe_line = lines.next();
            continue;
        }

        let (key, val) = match extract_header_line(line) {
            None => break,
            Some((k, v)) => (k, v),
        };

        match key {
            "ID" => id = val.to_string(),
            "DATE" => date = val.to_string(),
            "AUTHOR" => author = val.to_string(),
            "TAGS" => tags = val.to_string(),
            _ => {}
        }
        maybe_line = lines.next();
    }

    if start_with_comment {
        loop {
            match maybe_line {
                Some(line) if line.trim() == "-->" => {
                    maybe_line = lines.next();
                    break;
                }
                Some(_) => maybe_line = lines.next(),
                None => {
                    return Err(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("End of comment in the header is missing - file={}", file_name.display()),
                    ));
                }
            }
        }
    }

    if date.is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("Post header has no DATE - file={}", file_name.display()),
        ));
    }

    let date = parse_date_time(&date)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", e, file_name.display())))?;

    let header = PostHeader {
        id,
        date,
        author,
        tags: extract_tags(&tags),
    };

    Ok((header, lines, maybe_line))
}

pub fn parse_title_markdown<'a>(lines: Lines<'a>, mut maybe_line: Option<&'a str>) -> (String, Lines<'a>) {
    let mut lines = lines;
    let title = loop {
        match maybe_line {
            Some(line) if line.starts_with("# ") => break line[2..].trim().to_string(),
            Some(_) => maybe_line = lines.next(),
            None => break "".to_string(),
        }
    };
    (title, lines)
}

pub fn collect_lines(lines: Lines) -> String {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

pub fn extract_tags(tags_str: &str) -> Vec<String> {
    tags_str.split(' ')
        .filter(|x| !x.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn extract_header_line(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"\[(?P<key>\w+)\]: # \((?P<value>.+)\)").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res: String = String::new();
    let mut slice = Some(md_post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let md_buf: &str = match block.find(start_comment) {
            Some(start) => {
                let to_render: &str = &block[0..start];

                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => {
                        slice = Some(&next[(end + end_comment.len())..]);
                    }
                    None => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            "Error finding end of comment",
                        ));
                    }
                };

                to_render
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(md_buf);
    }

    Ok(res)
}

pub fn render_markdown(md_text: &str) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    match markdown::to_html_with_options(buf.as_str(), &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    }
}
