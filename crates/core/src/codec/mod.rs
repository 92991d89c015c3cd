//! File codec for math files
//!
//! Two formats share one open path, told apart by magic bytes:
//! - Plain text: the whole file is the UTF-8 math text
//! - Zip container: `math.txt` (UTF-8), optional `drawing-data.txt` (ASCII)
//!   and `drawing.png` (write-only, for external viewers)

pub mod data_url;

pub use data_url::{decode_png_data_url, encode_png_data_url, PNG_DATA_URL_PREFIX};

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CoreError, Result};
use crate::types::{FileFormat, MathDocument};
use crate::ZIP_MAGIC;

pub const MATH_ENTRY: &str = "math.txt";
pub const DRAWING_DATA_ENTRY: &str = "drawing-data.txt";
pub const DRAWING_PNG_ENTRY: &str = "drawing.png";

/// Read any file saved by MathPaste
///
/// The returned document never carries a raster; `drawing.png` is not read.
///
/// # Errors
/// * `CoreError::Io` - reading the file failed
/// * `CoreError::Encoding` - text is not UTF-8 (or drawing data not ASCII)
/// * `CoreError::CorruptArchive` - starts like a zip but isn't a valid one
/// * `CoreError::UnrecognizedContainer` - valid zip without `math.txt`
pub fn read_math_file(path: &Path) -> Result<(FileFormat, MathDocument)> {
    let format = sniff_format(path)?;
    tracing::debug!("Reading {} as {:?}", path.display(), format);

    let document = match format {
        FileFormat::PlainText => {
            let bytes = fs::read(path)?;
            MathDocument::new(decode_utf8(bytes, &path.display().to_string())?)
        }
        FileFormat::ZipContainer => read_container(path)?,
    };

    Ok((format, document))
}

/// Save a document in the given format
///
/// `PlainText` silently drops the drawing; see [`drops_drawing`] for the
/// warning callers owe the user.
pub fn write_math_file(path: &Path, format: FileFormat, document: &MathDocument) -> Result<()> {
    tracing::debug!("Writing {} as {:?}", path.display(), format);

    match format {
        FileFormat::PlainText => {
            fs::write(path, document.math_text.as_bytes())?;
        }
        FileFormat::ZipContainer => write_container(path, document)?,
    }

    Ok(())
}

/// True when saving `document` as `format` loses its drawing
pub fn drops_drawing(format: FileFormat, document: &MathDocument) -> bool {
    format == FileFormat::PlainText && document.has_drawing()
}

/// Decide the format from the first four bytes, ignoring the extension
fn sniff_format(path: &Path) -> Result<FileFormat> {
    let mut magic = Vec::with_capacity(ZIP_MAGIC.len());
    File::open(path)?
        .take(ZIP_MAGIC.len() as u64)
        .read_to_end(&mut magic)?;

    if magic == ZIP_MAGIC {
        Ok(FileFormat::ZipContainer)
    } else {
        Ok(FileFormat::PlainText)
    }
}

fn read_container(path: &Path) -> Result<MathDocument> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;

    let math_bytes = match read_entry(&mut archive, MATH_ENTRY)? {
        Some(bytes) => bytes,
        None => {
            return Err(CoreError::UnrecognizedContainer {
                path: path.display().to_string(),
            })
        }
    };
    let math_text = decode_utf8(math_bytes, MATH_ENTRY)?;

    // not every container has a drawing
    let drawing_vector_data = match read_entry(&mut archive, DRAWING_DATA_ENTRY)? {
        Some(bytes) => decode_ascii(bytes, DRAWING_DATA_ENTRY)?,
        None => String::new(),
    };

    Ok(MathDocument {
        math_text,
        drawing_vector_data,
        drawing_raster_data_url: String::new(),
    })
}

/// Read a whole entry, `None` when the archive has no such entry
fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(archive_error(e)),
    };

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).map_err(damaged_or_io)?;
    Ok(Some(bytes))
}

/// Errors while parsing an archive that has already been opened
fn archive_error(err: ZipError) -> CoreError {
    match err {
        ZipError::Io(e) => damaged_or_io(e),
        other => other.into(),
    }
}

/// The zip reader reports truncation and CRC mismatches as I/O errors
fn damaged_or_io(err: io::Error) -> CoreError {
    match err.kind() {
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            CoreError::CorruptArchive(err.to_string())
        }
        _ => CoreError::Io(err),
    }
}

fn write_container(path: &Path, document: &MathDocument) -> Result<()> {
    // Decode before touching the file so a bad raster leaves nothing behind
    let drawing = if document.has_drawing() {
        if !document.drawing_vector_data.is_ascii() {
            return Err(CoreError::Encoding {
                what: DRAWING_DATA_ENTRY.to_string(),
                encoding: "ASCII",
            });
        }
        let png = decode_png_data_url(&document.drawing_raster_data_url)?;
        Some((document.drawing_vector_data.as_bytes(), png))
    } else {
        None
    };

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip.start_file(MATH_ENTRY, options)?;
    zip.write_all(document.math_text.as_bytes())?;

    if let Some((vector_data, png)) = drawing {
        zip.start_file(DRAWING_DATA_ENTRY, options)?;
        zip.write_all(vector_data)?;

        zip.start_file(DRAWING_PNG_ENTRY, options)?;
        zip.write_all(&png)?;
    }

    zip.finish()?;
    Ok(())
}

fn decode_utf8(bytes: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| CoreError::Encoding {
        what: what.to_string(),
        encoding: "UTF-8",
    })
}

fn decode_ascii(bytes: Vec<u8>, what: &str) -> Result<String> {
    if !bytes.is_ascii() {
        return Err(CoreError::Encoding {
            what: what.to_string(),
            encoding: "ASCII",
        });
    }
    decode_utf8(bytes, what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_plain_text_roundtrip_unicode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("math.txt");
        let math = "∫ x² dx = x³/3 + C\r\n√(α+β) 🎉";

        write_math_file(&path, FileFormat::PlainText, &MathDocument::new(math)).unwrap();
        let (format, doc) = read_math_file(&path).unwrap();

        assert_eq!(format, FileFormat::PlainText);
        assert_eq!(doc.math_text, math);
        assert_eq!(doc.drawing_vector_data, "");
    }

    #[test]
    fn test_zip_roundtrip_with_drawing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("math.zip");
        let doc = MathDocument::with_drawing("a+b", "M0,0L10,10", encode_png_data_url(PNG));

        write_math_file(&path, FileFormat::ZipContainer, &doc).unwrap();
        let (format, read) = read_math_file(&path).unwrap();

        assert_eq!(format, FileFormat::ZipContainer);
        assert_eq!(read.math_text, "a+b");
        assert_eq!(read.drawing_vector_data, "M0,0L10,10");
        assert_eq!(read.drawing_raster_data_url, "");
        assert_eq!(
            entry_names(&path),
            vec!["drawing-data.txt", "drawing.png", "math.txt"]
        );

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut png = Vec::new();
        archive
            .by_name(DRAWING_PNG_ENTRY)
            .unwrap()
            .read_to_end(&mut png)
            .unwrap();
        assert_eq!(png, PNG);
    }

    #[test]
    fn test_zip_without_drawing_has_only_math() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.zip");

        write_math_file(&path, FileFormat::ZipContainer, &MathDocument::new("x^2")).unwrap();

        assert_eq!(entry_names(&path), vec!["math.txt"]);
        let (format, doc) = read_math_file(&path).unwrap();
        assert_eq!(format, FileFormat::ZipContainer);
        assert_eq!(doc, MathDocument::new("x^2"));
    }

    #[test]
    fn test_zip_without_math_is_unrecognized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.zip");
        write_zip(&path, &[("readme.md", b"hello")]);

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::UnrecognizedContainer { .. }));
    }

    #[test]
    fn test_broken_zip_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.zip");
        fs::write(&path, b"PK\x03\x04this is not really a zip file").unwrap();

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::CorruptArchive(_)));
    }

    #[test]
    fn test_checksum_mismatch_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flipped.zip");
        let math: &[u8] = b"x^2 + y^2 = r^2";
        write_zip(&path, &[("math.txt", math)]);

        let mut bytes = fs::read(&path).unwrap();
        let at = bytes
            .windows(math.len())
            .position(|w| w == math)
            .unwrap();
        bytes[at] ^= 0x01;
        fs::write(&path, bytes).unwrap();

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::CorruptArchive(_)), "{:?}", err);
        assert_eq!(err.user_message(), "The zip file seems to be damaged.");
    }

    #[test]
    fn test_truncated_container_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cut.zip");
        let doc = MathDocument::with_drawing("a+b", "M0,0", encode_png_data_url(PNG));
        write_math_file(&path, FileFormat::ZipContainer, &doc).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::CorruptArchive(_)), "{:?}", err);
        assert_eq!(err.user_message(), "The zip file seems to be damaged.");
    }

    #[test]
    fn test_non_zip_bytes_parse_as_text_regardless_of_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("looks-like.zip");
        fs::write(&path, "PK but not a zip").unwrap();

        let (format, doc) = read_math_file(&path).unwrap();
        assert_eq!(format, FileFormat::PlainText);
        assert_eq!(doc.math_text, "PK but not a zip");
    }

    #[test]
    fn test_short_and_empty_files_are_text() {
        let dir = TempDir::new().unwrap();
        let short = dir.path().join("short");
        fs::write(&short, b"PK").unwrap();
        let empty = dir.path().join("empty");
        fs::write(&empty, b"").unwrap();

        assert_eq!(
            read_math_file(&short).unwrap(),
            (FileFormat::PlainText, MathDocument::new("PK"))
        );
        assert_eq!(
            read_math_file(&empty).unwrap(),
            (FileFormat::PlainText, MathDocument::new(""))
        );
    }

    #[test]
    fn test_invalid_utf8_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9").unwrap();

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::Encoding { encoding: "UTF-8", .. }));
    }

    #[test]
    fn test_non_ascii_drawing_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weird.zip");
        write_zip(
            &path,
            &[("math.txt", b"x"), ("drawing-data.txt", "ä".as_bytes())],
        );

        let err = read_math_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::Encoding { encoding: "ASCII", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_math_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn test_plain_text_drops_drawing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let doc = MathDocument::with_drawing("y", "strokes", encode_png_data_url(PNG));

        assert!(drops_drawing(FileFormat::PlainText, &doc));
        assert!(!drops_drawing(FileFormat::ZipContainer, &doc));

        write_math_file(&path, FileFormat::PlainText, &doc).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"y");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_bad_raster_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.zip");
        let doc = MathDocument::with_drawing("y", "strokes", "data:image/gif;base64,AAAA");

        let err = write_math_file(&path, FileFormat::ZipContainer, &doc).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDataUrl(_)));
        assert!(!path.exists());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn ascii_string(min: usize) -> impl Strategy<Value = String> {
            proptest::collection::vec(0u8..0x80, min..64)
                .prop_map(|bytes| bytes.into_iter().map(char::from).collect())
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn plain_text_roundtrip(math in any::<String>()) {
                // such text is indistinguishable from a zip by design
                prop_assume!(!math.as_bytes().starts_with(&ZIP_MAGIC));

                let dir = TempDir::new().unwrap();
                let path = dir.path().join("math.txt");
                let doc = MathDocument::new(math.clone());
                write_math_file(&path, FileFormat::PlainText, &doc).unwrap();

                let (format, doc) = read_math_file(&path).unwrap();
                prop_assert_eq!(format, FileFormat::PlainText);
                prop_assert_eq!(doc, MathDocument::new(math));
            }

            #[test]
            fn zip_roundtrip(
                math in any::<String>(),
                vector_data in ascii_string(1),
                png in proptest::collection::vec(any::<u8>(), 0..256),
            ) {
                let dir = TempDir::new().unwrap();
                let path = dir.path().join("math.zip");
                let doc = MathDocument::with_drawing(
                    math.clone(),
                    vector_data.clone(),
                    encode_png_data_url(&png),
                );
                write_math_file(&path, FileFormat::ZipContainer, &doc).unwrap();

                let (format, read) = read_math_file(&path).unwrap();
                prop_assert_eq!(format, FileFormat::ZipContainer);
                prop_assert_eq!(read.math_text, math);
                prop_assert_eq!(read.drawing_vector_data, vector_data);
                prop_assert_eq!(read.drawing_raster_data_url, "");
            }

            #[test]
            fn without_magic_is_plain_text(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                prop_assume!(!bytes.starts_with(&ZIP_MAGIC));

                let dir = TempDir::new().unwrap();
                let path = dir.path().join("data.zip");
                fs::write(&path, &bytes).unwrap();

                match read_math_file(&path) {
                    Ok((format, doc)) => {
                        prop_assert_eq!(format, FileFormat::PlainText);
                        prop_assert_eq!(doc.math_text.as_bytes(), &bytes[..]);
                    }
                    Err(err) => {
                        prop_assert!(
                            matches!(err, CoreError::Encoding { encoding: "UTF-8", .. }),
                            "{:?}",
                            err
                        );
                    }
                }
            }
        }
    }
}
