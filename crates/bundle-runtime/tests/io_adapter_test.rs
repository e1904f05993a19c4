//! std::io adapters write the same bytes as the in-memory writer.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use bundle_runtime::{
    read_collection_size, write_collection_size, BundleError, BundleRead, BundleWrite,
    BundleWriter, IoReader, IoWriter,
};
use tempfile::TempDir;

fn write_sample<W: BundleWrite>(writer: &mut W) -> Result<(), BundleError> {
    writer.write_string("bundle")?;
    write_collection_size(writer, 1000)?;
    writer.write_f64(2.5f64)?;
    writer.write_char('ß')?;
    writer.write_i128(-1i128)
}

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.bin");

    {
        let file = File::create(&path).unwrap();
        let mut writer = IoWriter::new(BufWriter::new(file));
        write_sample(&mut writer).unwrap();
        let inner = writer.into_inner();
        inner.into_inner().unwrap().sync_all().unwrap();
    }

    let mut expected = BundleWriter::new();
    write_sample(&mut expected).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), expected.as_bytes());

    let mut reader = IoReader::new(BufReader::new(File::open(&path).unwrap()));
    assert_eq!(reader.read_string().unwrap(), "bundle");
    assert_eq!(read_collection_size(&mut reader).unwrap(), 1000);
    assert_eq!(reader.read_f64().unwrap(), 2.5);
    assert_eq!(reader.read_char().unwrap(), 'ß');
    assert_eq!(reader.read_i128().unwrap(), -1);
}

#[test]
fn test_truncated_file_surfaces_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.bin");
    std::fs::write(&path, [1u8, 2]).unwrap();

    let mut reader = IoReader::new(File::open(&path).unwrap());
    let err = reader.read_u32().unwrap_err();
    assert!(matches!(err, BundleError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
}
