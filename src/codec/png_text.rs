//! PNG text chunk handling
//!
//! Latin-1 text goes into `tEXt` chunks, anything else into UTF-8 `iTXt`.
//! Reading accepts `tEXt`, `zTXt` and `iTXt`, so files annotated by other
//! tools are searchable too.

use std::io::{BufReader, Read, Write};

use super::CodecError;
use crate::contract::TextAttributes;

fn is_latin1(s: &str) -> bool {
    s.chars().all(|c| (c as u32) <= 0xFF)
}

/// Queue one key-value attribute on `encoder`
pub fn add_text_attribute<W: Write>(
    encoder: &mut png::Encoder<'_, W>,
    key: &str,
    value: &str,
) -> Result<(), png::EncodingError> {
    if is_latin1(key) && is_latin1(value) {
        encoder.add_text_chunk(key.to_string(), value.to_string())
    } else {
        encoder.add_itxt_chunk(key.to_string(), value.to_string())
    }
}

/// Collect all text attributes stored ahead of the image data
///
/// When a key appears more than once the last chunk kind read wins
/// (`iTXt` over `zTXt` over `tEXt`).
pub fn read_text_attributes<R: Read>(input: R) -> Result<TextAttributes, CodecError> {
    let decoder = png::Decoder::new(BufReader::new(input));
    let reader = decoder.read_info()?;
    let info = reader.info();

    let mut attributes = TextAttributes::new();
    for chunk in &info.uncompressed_latin1_text {
        attributes.insert(chunk.keyword.clone(), chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        attributes.insert(chunk.keyword.clone(), chunk.get_text()?);
    }
    for chunk in &info.utf8_text {
        attributes.insert(chunk.keyword.clone(), chunk.get_text()?);
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a 1x1 gray PNG, letting `configure` add chunks
    fn png_with(configure: impl FnOnce(&mut png::Encoder<'_, &mut Vec<u8>>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 1, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            configure(&mut encoder);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0]).unwrap();
            writer.finish().unwrap();
        }
        bytes
    }

    #[test]
    fn test_latin1_detection() {
        assert!(is_latin1("Café"));
        assert!(!is_latin1("Łódź"));
    }

    #[test]
    fn test_reads_plain_text_chunk() {
        let bytes = png_with(|encoder| {
            encoder
                .add_text_chunk("OCR_Text".to_string(), "hello".to_string())
                .unwrap();
            encoder
                .add_text_chunk("Software".to_string(), "other tool".to_string())
                .unwrap();
        });

        let attributes = read_text_attributes(Cursor::new(bytes)).unwrap();
        assert_eq!(attributes["OCR_Text"], "hello");
        assert_eq!(attributes["Software"], "other tool");
    }

    #[test]
    fn test_reads_compressed_text_chunk() {
        let long_text = "compressed ".repeat(50);
        let bytes = png_with(|encoder| {
            encoder
                .add_ztxt_chunk("OCR_Text".to_string(), long_text.clone())
                .unwrap();
        });

        let attributes = read_text_attributes(Cursor::new(bytes)).unwrap();
        assert_eq!(attributes["OCR_Text"], long_text);
    }

    #[test]
    fn test_non_latin1_goes_through_itxt() {
        let bytes = png_with(|encoder| {
            add_text_attribute(encoder, "OCR_Text", "Źdźbło").unwrap();
        });

        let attributes = read_text_attributes(Cursor::new(bytes)).unwrap();
        assert_eq!(attributes["OCR_Text"], "Źdźbło");
    }

    #[test]
    fn test_no_text_chunks() {
        let bytes = png_with(|_| {});
        let attributes = read_text_attributes(Cursor::new(bytes)).unwrap();
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_truncated_signature_fails() {
        let result = read_text_attributes(Cursor::new(vec![0x89, b'P', b'N']));
        assert!(matches!(result, Err(CodecError::PngDecode(_))));
    }
}
