use toml::{value::Map, Value};
use tracing::debug;

use crate::Error;

const SEPARATORS: &[char] = &['\n', ';'];

/// Sets values of a TOML document from `<key> = <value>` scripts.
///
/// Scripts are separated by newlines or `;`. Keys may be dotted to reach
/// into tables (`sim.pose_rate_hz = 10.0`); missing tables are created.
/// Values use TOML syntax.
pub fn overwrite(doc: &mut Value, scripts: &str) -> Result<(), Error> {
    for script in split_scripts(scripts) {
        let (key, value) = parse_script(&script)?;
        debug!(?key, ?value, "overwrite");
        let invalid = |message: &str| Error::InvalidOverwrite(script.clone(), message.to_owned());

        let mut path: Vec<&str> = key.split('.').map(str::trim).collect();
        if path.iter().any(|k| k.is_empty()) {
            return Err(invalid("empty key"));
        }
        let Some(last) = path.pop() else {
            return Err(invalid("empty key"));
        };
        let mut table = doc
            .as_table_mut()
            .ok_or_else(|| invalid("document is not a table"))?;
        for k in path {
            table = table
                .entry(k.to_owned())
                .or_insert_with(|| Value::Table(Map::new()))
                .as_table_mut()
                .ok_or_else(|| invalid(&format!("`{k}` is not a table")))?;
        }
        table.insert(last.to_owned(), value);
    }
    Ok(())
}

/// Same as [`overwrite`], on the document as a string.
pub fn overwrite_str(doc: &str, scripts: &str) -> Result<String, Error> {
    let mut doc: Value = toml::from_str(doc)
        .map_err(|e| Error::InvalidOverwrite(doc.to_owned(), e.to_string()))?;
    overwrite(&mut doc, scripts)?;
    toml::to_string(&doc).map_err(|e| Error::InvalidOverwrite(scripts.to_owned(), e.to_string()))
}

fn parse_script(script: &str) -> Result<(String, Value), Error> {
    let (key, value) = script
        .split_once('=')
        .ok_or_else(|| Error::InvalidOverwrite(script.to_owned(), "expected `=`".to_owned()))?;
    let value: Value = toml::from_str(&format!("a = {}", value.trim()))
        .map_err(|e| Error::InvalidOverwrite(script.to_owned(), e.to_string()))?;
    Ok((key.trim().to_owned(), value["a"].clone()))
}

/// Splits on separators that are not inside a string, array or inline table.
fn split_scripts(s: &str) -> Vec<String> {
    let mut scripts = vec![];
    let mut buf = String::new();
    let mut quote = None;
    let mut depth = 0_i32;
    for ch in s.chars() {
        match (quote, ch) {
            (Some(q), _) if ch == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth -= 1,
            (None, _) if depth <= 0 && SEPARATORS.contains(&ch) => {
                if !buf.trim().is_empty() {
                    scripts.push(buf.trim().to_owned());
                }
                buf.clear();
                continue;
            }
            _ => {}
        }
        buf.push(ch);
    }
    if !buf.trim().is_empty() {
        scripts.push(buf.trim().to_owned());
    }
    scripts
}
