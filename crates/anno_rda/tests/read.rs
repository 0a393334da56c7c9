use std::io::Cursor;

use anno_rda::{
    cipher::{self, SEED},
    compression,
    error::{Error, Result},
    types::{BlockHeader, FileEntry, MAGIC_V2_0},
    BlockFlags, RdaArchive, WriteOptions,
};
use binrw::BinWrite;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn header_only() -> Vec<u8> {
    let mut data = vec![0u8; 1048];
    data[..36].copy_from_slice(MAGIC_V2_0);
    data[1044..].copy_from_slice(&u32::MAX.to_le_bytes());
    data
}

fn encode(plain: &[u8], flags: BlockFlags) -> Result<Vec<u8>> {
    let mut stored = if flags.contains(BlockFlags::COMPRESSED) {
        compression::compress(plain)?
    } else {
        plain.to_vec()
    };
    if flags.contains(BlockFlags::ENCRYPTED) {
        stored = cipher::encrypt(&stored, SEED);
    }
    Ok(stored)
}

/// Append a block storing every file separately, returning the offset of its header
fn push_plain_block(
    data: &mut Vec<u8>,
    files: &[(&str, &[u8])],
    flags: BlockFlags,
) -> Result<usize> {
    let mut table = Cursor::new(Vec::new());
    for (path, content) in files {
        let stored = encode(content, flags)?;
        FileEntry {
            path: FileEntry::encode_path(path)?,
            offset: data.len() as u32,
            compressed_size: stored.len() as u32,
            uncompressed_size: content.len() as u32,
            timestamp: 1_700_000_000,
        }
        .write(&mut table)?;
        data.extend_from_slice(&stored);
    }

    let table = table.into_inner();
    let stored_table = encode(&table, flags)?;
    data.extend_from_slice(&stored_table);

    let header_offset = data.len();
    let mut header = Cursor::new(Vec::new());
    BlockHeader {
        flags,
        file_count: files.len() as u32,
        compressed_table_size: stored_table.len() as u32,
        uncompressed_table_size: table.len() as u32,
        next_block_offset: u32::MAX,
    }
    .write(&mut header)?;
    data.extend_from_slice(&header.into_inner());

    Ok(header_offset)
}

fn link(data: &mut [u8], pointer: usize, target: usize) {
    data[pointer..pointer + 4].copy_from_slice(&(target as u32).to_le_bytes());
}

fn scenario() -> Result<Vec<u8>> {
    let mut rda = RdaArchive::new();
    rda.add_block();
    rda.update_file("data/a.txt", b"hello".to_vec())?;
    rda.update_file("data/b.bin", vec![0x01, 0x02, 0x03])?;
    rda.serialize(WriteOptions::default())
}

#[traced_test]
#[test]
fn read_written_archive() -> Result<()> {
    let mut rda = RdaArchive::from_bytes(scenario()?)?;

    assert_eq!(rda.index(), vec!["data/a.txt", "data/b.bin"]);
    assert_eq!(rda.len(), 2);
    assert_eq!(rda.uncompressed_size(), 8);
    assert_eq!(rda.extract_file("data/a.txt")?, b"hello");
    assert_eq!(rda.extract_file("data\\b.bin")?, &[0x01, 0x02, 0x03]);
    assert!(rda.does_file_exist("data\\a.txt"));

    Ok(())
}

#[traced_test]
#[test]
fn read_missing_file() -> Result<()> {
    let mut rda = RdaArchive::from_bytes(scenario()?)?;
    assert!(matches!(
        rda.extract_file("missing/path"),
        Err(Error::FileNotFound(_))
    ));
    assert!(!rda.does_file_exist("missing/path"));

    Ok(())
}

#[traced_test]
#[test]
fn read_decodes_chunk_once() -> Result<()> {
    let mut rda = RdaArchive::from_bytes(scenario()?)?;
    assert!(!rda.blocks()[0].is_chunk_loaded());

    assert_eq!(rda.extract_file("data/a.txt")?, b"hello");
    assert_eq!(rda.extract_file("data/b.bin")?, &[0x01, 0x02, 0x03]);
    assert_eq!(rda.extract_file("data/a.txt")?, b"hello");
    assert!(rda.blocks()[0].is_chunk_loaded());

    // one for the file table, one for the resident chunk
    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|line| line.contains("inflated")).count() {
            2 => Ok(()),
            n => Err(format!("expected 2 inflations, got {n}")),
        }
    });

    Ok(())
}

#[traced_test]
#[test]
fn read_plain_blocks() -> Result<()> {
    for flags in [
        BlockFlags::empty(),
        BlockFlags::COMPRESSED,
        BlockFlags::ENCRYPTED,
        BlockFlags::COMPRESSED | BlockFlags::ENCRYPTED,
    ] {
        let mut data = header_only();
        let header = push_plain_block(
            &mut data,
            &[
                ("x/one.txt", b"first file".as_slice()),
                ("x/two.txt", b"the second file".as_slice()),
            ],
            flags,
        )?;
        link(&mut data, 1044, header);

        let mut rda = RdaArchive::from_bytes(data)?;
        assert_eq!(rda.blocks()[0].flags(), flags);
        assert_eq!(rda.extract_file("x/two.txt")?, b"the second file");
        assert_eq!(rda.extract_file("x/one.txt")?, b"first file");
        assert_eq!(
            rda.file("x/one.txt").map(|f| f.timestamp()),
            Some(1_700_000_000)
        );
    }

    Ok(())
}

#[traced_test]
#[test]
fn read_first_match_wins() -> Result<()> {
    let mut data = header_only();
    let first = push_plain_block(
        &mut data,
        &[("dup.txt", b"first".as_slice())],
        BlockFlags::COMPRESSED,
    )?;
    let second = push_plain_block(
        &mut data,
        &[
            ("other.txt", b"other".as_slice()),
            ("dup.txt", b"second".as_slice()),
        ],
        BlockFlags::COMPRESSED,
    )?;
    link(&mut data, 1044, first);
    link(&mut data, first + 16, second);

    let mut rda = RdaArchive::from_bytes(data)?;
    assert_eq!(rda.index(), vec!["dup.txt", "other.txt", "dup.txt"]);
    assert_eq!(rda.extract_file("dup.txt")?, b"first");

    rda.delete_file("dup.txt")?;
    assert_eq!(rda.extract_file("dup.txt")?, b"second");

    Ok(())
}

#[traced_test]
#[test]
fn read_corrupt_file_count() -> Result<()> {
    let mut data = scenario()?;
    let header = data.len() - 20;
    data[header + 4] ^= 0x01;

    assert!(matches!(
        RdaArchive::from_bytes(data),
        Err(Error::CorruptArchive(_))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn read_corrupt_table_size() -> Result<()> {
    let mut data = scenario()?;
    let header = data.len() - 20;
    data[header + 11] ^= 0x80;

    assert!(matches!(
        RdaArchive::from_bytes(data),
        Err(Error::CorruptArchive(_))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn read_corrupt_data() -> Result<()> {
    let mut data = header_only();
    let header = push_plain_block(
        &mut data,
        &[("a.txt", b"aaaaaaaa".as_slice())],
        BlockFlags::COMPRESSED,
    )?;
    link(&mut data, 1044, header);
    // the zlib header of the file data
    data[1048] ^= 0xFF;

    let mut rda = RdaArchive::from_bytes(data)?;
    assert!(rda.does_file_exist("a.txt"));
    assert!(matches!(
        rda.extract_file("a.txt"),
        Err(Error::CorruptArchive(_))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn read_from_disk() -> Result<()> {
    let path = std::env::temp_dir().join(format!("anno_rda_read_{}.rda", std::process::id()));
    std::fs::write(&path, scenario()?)?;

    let rda = RdaArchive::open(&path);
    std::fs::remove_file(&path)?;

    assert_eq!(rda?.index(), vec!["data/a.txt", "data/b.bin"]);
    assert!(matches!(
        RdaArchive::open(&path),
        Err(Error::IOError(_))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn rewrite_plain_block_as_resident() -> Result<()> {
    let mut data = header_only();
    let header = push_plain_block(
        &mut data,
        &[
            ("x/one.txt", b"first file".as_slice()),
            ("x/two.txt", b"the second file".as_slice()),
        ],
        BlockFlags::COMPRESSED | BlockFlags::ENCRYPTED,
    )?;
    link(&mut data, 1044, header);

    let mut rda = RdaArchive::from_bytes(data)?;
    let mut read = RdaArchive::from_bytes(rda.serialize(WriteOptions::default())?)?;

    assert_eq!(
        read.blocks()[0].flags(),
        BlockFlags::COMPRESSED | BlockFlags::RESIDENT
    );
    assert_eq!(read.index(), vec!["x/one.txt", "x/two.txt"]);
    assert_eq!(read.extract_file("x/two.txt")?, b"the second file");
    assert!(read.entries().all(|f| f.timestamp() == 1_700_000_000));

    Ok(())
}

#[traced_test]
#[test]
fn update_clears_timestamp() -> Result<()> {
    let mut data = header_only();
    let header = push_plain_block(
        &mut data,
        &[
            ("x/one.txt", b"first file".as_slice()),
            ("x/two.txt", b"the second file".as_slice()),
        ],
        BlockFlags::COMPRESSED,
    )?;
    link(&mut data, 1044, header);

    let mut rda = RdaArchive::from_bytes(data)?;
    rda.update_file("x/two.txt", b"replaced".to_vec())?;
    assert_eq!(rda.file("x/two.txt").map(|f| f.timestamp()), Some(0));

    let read = RdaArchive::from_bytes(rda.serialize(WriteOptions::default())?)?;
    assert_eq!(
        read.file("x/one.txt").map(|f| f.timestamp()),
        Some(1_700_000_000)
    );
    assert_eq!(read.file("x/two.txt").map(|f| f.timestamp()), Some(0));

    Ok(())
}
