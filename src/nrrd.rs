//! NRRD attached-header text format
//!
//! Only the subset needed by volume sequences is understood; unknown fields
//! are ignored on read.

use crate::error::{Result, SeqError};
use crate::header::{ArrayHeader, Encoding};
use crate::types::{AxisKind, DataType, Endian, Space};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Magic line written at the top of every file
pub const NRRD_MAGIC: &str = "NRRD0004";

/// Prefix shared by all NRRD format versions
pub const NRRD_MAGIC_PREFIX: &str = "NRRD000";

fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn format_vector(vector: &[f64; 3]) -> String {
    format!(
        "({},{},{})",
        format_number(vector[0]),
        format_number(vector[1]),
        format_number(vector[2])
    )
}

fn format_quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the header text, including the blank line that ends it
pub fn format_header(header: &ArrayHeader) -> Result<String> {
    let dimension = header.dimension();
    if header.axis_sizes.len() != dimension {
        return Err(SeqError::InvalidDimensions(format!(
            "{} axis kinds for {} axis sizes",
            dimension,
            header.axis_sizes.len()
        )));
    }
    for field in header.fields.keys().chain(header.fields.values()) {
        if field.contains('\n') || field.contains('\r') {
            return Err(SeqError::Format(format!("field {:?} spans lines", field)));
        }
    }

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", NRRD_MAGIC);
    let _ = writeln!(out, "# Complete NRRD file format specification at:");
    let _ = writeln!(out, "# http://teem.sourceforge.net/nrrd/format.html");
    let _ = writeln!(out, "type: {}", header.data_type.nrrd_name());
    let _ = writeln!(out, "dimension: {}", dimension);
    if let Some(space) = header.space {
        let _ = writeln!(out, "space: {}", space.as_str());
    }
    let sizes: Vec<String> = header.axis_sizes.iter().map(|s| s.to_string()).collect();
    let _ = writeln!(out, "sizes: {}", sizes.join(" "));
    if header.space.is_some() && header.space_directions.iter().any(Option::is_some) {
        let directions: Vec<String> = header
            .space_directions
            .iter()
            .map(|direction| match direction {
                Some(vector) => format_vector(vector),
                None => "none".to_string(),
            })
            .collect();
        let _ = writeln!(out, "space directions: {}", directions.join(" "));
    }
    let kinds: Vec<&str> = header.axis_kinds.iter().map(AxisKind::as_str).collect();
    let _ = writeln!(out, "kinds: {}", kinds.join(" "));
    if header.axis_labels.iter().any(|label| !label.is_empty()) {
        let _ = writeln!(out, "labels: {}", format_quoted(&header.axis_labels));
    }
    if header.axis_units.iter().any(|unit| !unit.is_empty()) {
        let _ = writeln!(out, "units: {}", format_quoted(&header.axis_units));
    }
    if header.data_type.size_in_bytes() > 1 {
        let _ = writeln!(out, "endian: {}", header.endian.as_str());
    }
    let _ = writeln!(out, "encoding: {}", header.encoding.as_str());
    if let (Some(_), Some(origin)) = (header.space, header.space_origin) {
        let _ = writeln!(out, "space origin: {}", format_vector(&origin));
    }
    if let Some(frame) = &header.measurement_frame {
        let columns: Vec<String> = (0..3)
            .map(|column| format_vector(&[frame[0][column], frame[1][column], frame[2][column]]))
            .collect();
        let _ = writeln!(out, "measurement frame: {}", columns.join(" "));
    }
    for (key, value) in &header.fields {
        let _ = writeln!(out, "{}:={}", key, value);
    }
    out.push('\n');
    Ok(out)
}

fn parse_number(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| SeqError::Parse(format!("{:?} is not a number", text)))
}

/// Parse `(x,y,z)` / `none` tokens
fn parse_vectors(value: &str) -> Result<Vec<Option<[f64; 3]>>> {
    let mut vectors = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("none") {
            vectors.push(None);
            rest = tail.trim_start();
        } else if rest.starts_with('(') {
            let close = rest
                .find(')')
                .ok_or_else(|| SeqError::Parse(format!("unterminated vector in {:?}", value)))?;
            let parts = rest[1..close]
                .split(',')
                .map(parse_number)
                .collect::<Result<Vec<_>>>()?;
            let vector: [f64; 3] = parts
                .try_into()
                .map_err(|_| SeqError::Parse(format!("expected 3-vectors in {:?}", value)))?;
            vectors.push(Some(vector));
            rest = rest[close + 1..].trim_start();
        } else {
            return Err(SeqError::Parse(format!("unexpected vector syntax {:?}", value)));
        }
    }
    Ok(vectors)
}

/// Parse a run of `"..."` strings with backslash escapes
fn parse_quoted(value: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    let mut chars = value.trim().chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let mut current = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => break,
                        },
                        Some('"') => break,
                        Some(other) => current.push(other),
                        None => {
                            return Err(SeqError::Parse(format!(
                                "unterminated string in {:?}",
                                value
                            )))
                        }
                    }
                }
                values.push(current);
            }
            c if c.is_whitespace() => {}
            _ => return Err(SeqError::Parse(format!("expected quoted strings in {:?}", value))),
        }
    }
    Ok(values)
}

fn per_axis<T>(field: &str, values: Vec<T>, dimension: usize) -> Result<Vec<T>> {
    if values.len() != dimension {
        return Err(SeqError::Parse(format!(
            "{} has {} entries for dimension {}",
            field,
            values.len(),
            dimension
        )));
    }
    Ok(values)
}

/// Parse header text (magic line up to, not including, the blank line)
pub fn parse_header(text: &str) -> Result<ArrayHeader> {
    let mut lines = text.lines();
    let magic = lines.next().unwrap_or_default().trim_end();
    if !magic.starts_with(NRRD_MAGIC_PREFIX) {
        return Err(SeqError::Parse(format!("bad magic line {:?}", magic)));
    }

    let mut standard: BTreeMap<String, String> = BTreeMap::new();
    let mut fields = BTreeMap::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once(":=") {
            fields.insert(key.to_string(), value.to_string());
        } else if let Some((key, value)) = line.split_once(": ") {
            standard.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        } else {
            return Err(SeqError::Parse(format!("unreadable header line {:?}", line)));
        }
    }

    let required = |key: &str| {
        standard
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SeqError::MissingField(key.to_string()))
    };

    if standard.contains_key("data file") || standard.contains_key("datafile") {
        return Err(SeqError::Parse("detached data files are not supported".to_string()));
    }

    let type_name = required("type")?;
    let data_type = DataType::from_nrrd_name(type_name)
        .ok_or_else(|| SeqError::Parse(format!("unsupported type {:?}", type_name)))?;
    let dimension: usize = required("dimension")?
        .parse()
        .map_err(|_| SeqError::Parse("dimension is not an integer".to_string()))?;
    let sizes = required("sizes")?
        .split_whitespace()
        .map(|size| {
            size.parse::<usize>()
                .map_err(|_| SeqError::Parse(format!("bad size {:?}", size)))
        })
        .collect::<Result<Vec<_>>>()?;
    let sizes = per_axis("sizes", sizes, dimension)?;
    let encoding_name = required("encoding")?;
    let encoding = Encoding::parse(encoding_name)
        .ok_or_else(|| SeqError::Parse(format!("unsupported encoding {:?}", encoding_name)))?;

    let kinds = match standard.get("kinds") {
        Some(value) => per_axis(
            "kinds",
            value.split_whitespace().map(AxisKind::parse).collect(),
            dimension,
        )?,
        None => vec![AxisKind::None; dimension],
    };

    let mut header = ArrayHeader::new(data_type, kinds, sizes)?.with_encoding(encoding);
    header.fields = fields;

    if let Some(value) = standard.get("labels") {
        header.axis_labels = per_axis("labels", parse_quoted(value)?, dimension)?;
    }
    if let Some(value) = standard.get("units") {
        header.axis_units = per_axis("units", parse_quoted(value)?, dimension)?;
    }
    if let Some(value) = standard.get("endian") {
        header.endian = match value.as_str() {
            "little" => Endian::Little,
            "big" => Endian::Big,
            other => return Err(SeqError::Parse(format!("unknown endian {:?}", other))),
        };
    }
    if let Some(value) = standard.get("space") {
        // Only RAS is read as-is; any other space is treated as LPS
        header.space = Some(Space::parse(value).unwrap_or(Space::Lps));
    }
    if let Some(value) = standard.get("space directions") {
        header.space_directions = per_axis("space directions", parse_vectors(value)?, dimension)?;
    } else if let Some(value) = standard.get("spacings") {
        // Axis-aligned fallback, one spacing per axis (nan for non-spatial axes)
        let mut spatial_axis = 0;
        let mut directions = Vec::with_capacity(dimension);
        for (axis, token) in value.split_whitespace().enumerate() {
            let step = token.parse::<f64>().unwrap_or(f64::NAN);
            if header.axis_kinds.get(axis).is_some_and(AxisKind::is_spatial) && step.is_finite() && spatial_axis < 3 {
                let mut vector = [0.0; 3];
                vector[spatial_axis] = step;
                spatial_axis += 1;
                directions.push(Some(vector));
            } else {
                directions.push(None);
            }
        }
        header.space_directions = per_axis("spacings", directions, dimension)?;
    }
    if let Some(value) = standard.get("space origin") {
        let origin = parse_vectors(value)?;
        header.space_origin = match origin.as_slice() {
            [Some(point)] => Some(*point),
            _ => return Err(SeqError::Parse(format!("bad space origin {:?}", value))),
        };
    }
    if let Some(value) = standard.get("measurement frame") {
        let columns = parse_vectors(value)?;
        let mut frame = [[0.0; 3]; 3];
        match columns.as_slice() {
            [Some(a), Some(b), Some(c)] => {
                for (column, vector) in [a, b, c].into_iter().enumerate() {
                    for row in 0..3 {
                        frame[row][column] = vector[row];
                    }
                }
            }
            _ => return Err(SeqError::Parse(format!("bad measurement frame {:?}", value))),
        }
        header.measurement_frame = Some(frame);
    }

    Ok(header)
}
