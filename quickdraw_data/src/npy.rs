//! Minimal reader for the NumPy `.npy` container, restricted to what the
//! Quick Draw bitmap dumps actually are: C-ordered `u8` arrays.

const MAGIC: &[u8] = b"\x93NUMPY";

/// Parses an `.npy` byte buffer into `(shape, payload)`.
///
/// Accepts format versions 1.x and 2.x, dtype `|u1` / `u1`, C order only.
/// Errors are plain strings; the caller attaches the file path.
pub fn parse_u8_array(bytes: &[u8]) -> Result<(Vec<usize>, &[u8]), String> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err("not a .npy file (bad magic)".into());
    }

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 => {
            if bytes.len() < 12 {
                return Err("truncated v2 header".into());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
            (len, 12)
        }
        other => return Err(format!("unsupported npy version {other}")),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err("truncated header".into());
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| "header is not valid utf-8".to_string())?;

    let descr = dict_value(header, "descr")?;
    let descr = descr.trim_matches(|c| c == '\'' || c == '"');
    if descr != "|u1" && descr != "u1" {
        return Err(format!("expected u8 samples, got dtype '{descr}'"));
    }

    let order = dict_value(header, "fortran_order")?;
    if !order.starts_with("False") {
        return Err("fortran-ordered arrays are not supported".into());
    }

    let shape = parse_shape(header)?;
    let expected: usize = shape.iter().product();
    let payload = &bytes[data_start..];
    if payload.len() != expected {
        return Err(format!(
            "payload length {} does not match shape {shape:?} ({expected} elements)",
            payload.len()
        ));
    }

    Ok((shape, payload))
}

/// Extracts the raw value text following `'key':` in the header dict.
fn dict_value<'a>(header: &'a str, key: &str) -> Result<&'a str, String> {
    let pattern = format!("'{key}':");
    let at = header
        .find(&pattern)
        .ok_or_else(|| format!("missing '{key}' in header"))?;
    let rest = header[at + pattern.len()..].trim_start();
    let end = rest
        .find([',', '}'])
        .ok_or_else(|| format!("unterminated '{key}' value"))?;
    Ok(rest[..end].trim())
}

fn parse_shape(header: &str) -> Result<Vec<usize>, String> {
    let at = header.find("'shape':").ok_or("missing 'shape' in header")?;
    let rest = &header[at..];
    let open = rest.find('(').ok_or("no '(' in shape")?;
    let close = rest.find(')').ok_or("no ')' in shape")?;

    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("bad shape component '{s}'"))
        })
        .collect()
}

/// Serializes a u8 array as a v1.0 `.npy` buffer. Used by tests and by
/// tooling that fabricates fixture data.
pub fn write_u8_array(shape: &[usize], data: &[u8]) -> Vec<u8> {
    let dims: Vec<String> = shape.iter().map(usize::to_string).collect();
    let shape_txt = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let mut header = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': {shape_txt}, }}"
    );
    // Pad so that header start + len is 64-byte aligned, newline-terminated.
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat(unpadded.div_ceil(64) * 64 - unpadded));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_2d_array() {
        let data: Vec<u8> = (0..12).collect();
        let bytes = write_u8_array(&[3, 4], &data);

        let (shape, payload) = parse_u8_array(&bytes).unwrap();
        assert_eq!(shape, vec![3, 4]);
        assert_eq!(payload, data.as_slice());
    }

    #[test]
    fn rejects_bad_magic() {
        let err = parse_u8_array(b"NOTNUMPYAT ALL").unwrap_err();
        assert!(err.contains("magic"), "{err}");
    }

    #[test]
    fn rejects_wrong_dtype() {
        let mut bytes = write_u8_array(&[2, 2], &[0, 1, 2, 3]);
        let pos = bytes.windows(3).position(|w| w == b"|u1").unwrap();
        bytes[pos..pos + 3].copy_from_slice(b"<f4");
        let err = parse_u8_array(&bytes).unwrap_err();
        assert!(err.contains("dtype"), "{err}");
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut bytes = write_u8_array(&[2, 2], &[0, 1, 2, 3]);
        bytes.pop();
        let err = parse_u8_array(&bytes).unwrap_err();
        assert!(err.contains("length"), "{err}");
    }

    #[test]
    fn parses_trailing_comma_1d_shape() {
        let bytes = write_u8_array(&[5], &[9; 5]);
        let (shape, payload) = parse_u8_array(&bytes).unwrap();
        assert_eq!(shape, vec![5]);
        assert_eq!(payload.len(), 5);
    }
}
