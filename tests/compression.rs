use anyhow::Result;
use csvshuf::io::compression::{codec_for_path, sniff_input_codec};
use csvshuf::testing::{TempDirPath, TempFilePath, numbered_lines, read_lines, split_lines};
use csvshuf::{GenOptions, ShuffleOptions, generate_csv, shuffle_file};
use std::fs;

#[test]
fn plain_paths_have_no_codec() -> Result<()> {
    assert!(codec_for_path("data.csv").is_none());
    let tmp = TempFilePath::with_lines(&["h", "a"])?;
    assert_eq!(sniff_input_codec(tmp.path())?, None);
    Ok(())
}

#[test]
fn text_starting_with_bz_is_not_bzip2() -> Result<()> {
    let tmp = TempFilePath::with_lines(&["BZ,code", "1,2"])?;
    assert_eq!(sniff_input_codec(tmp.path())?, None);
    Ok(())
}

#[test]
fn text_starting_with_bzh_is_shuffled() -> Result<()> {
    let lines: Vec<String> = ["BZh_code,name", "1,a", "2,b", "3,c"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let input = TempFilePath::with_lines(&lines)?;
    assert_eq!(sniff_input_codec(input.path())?, None);

    let dir = TempDirPath::new()?;
    let out = dir.file_path("out.csv");
    let report = shuffle_file(input.path(), &out, &ShuffleOptions::default().with_seed(6))?;
    assert_eq!(report.rows, 4);
    csvshuf::testing::assert_header_preserving_shuffle(&lines, &read_lines(&out)?);

    // Level digit present but no block marker after it.
    let digit = TempFilePath::with_lines(&["BZh9 header", "x"])?;
    assert_eq!(sniff_input_codec(digit.path())?, None);
    Ok(())
}

#[cfg(unix)]
#[test]
fn failed_final_write_is_reported() -> Result<()> {
    use csvshuf::io::compression::create_output;
    use std::io::Write;
    use std::path::Path;

    let full = Path::new("/dev/full");
    if fs::OpenOptions::new().write(true).open(full).is_err() {
        return Ok(());
    }
    let dir = TempDirPath::new()?;
    let names = [
        "out.csv",
        #[cfg(feature = "compression-gzip")]
        "out.csv.gz",
        #[cfg(feature = "compression-zstd")]
        "out.csv.zst",
        #[cfg(feature = "compression-bzip2")]
        "out.csv.bz2",
        #[cfg(feature = "compression-xz")]
        "out.csv.xz",
    ];
    for name in names {
        let link = dir.file_path(name);
        std::os::unix::fs::symlink(full, &link)?;
        let mut out = create_output(&link)?;
        out.write_all(b"h\na\nb\n")?;
        assert!(out.finish().is_err(), "{name}: error writing the end of the stream was lost");
    }

    let input = TempFilePath::with_lines(&numbered_lines(5))?;
    let err = shuffle_file(input.path(), dir.file_path("out.csv"), &ShuffleOptions::default())
        .unwrap_err();
    assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some(), "{err:#}");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
mod gzip {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(path: &std::path::Path) -> Result<String> {
        let mut text = String::new();
        GzDecoder::new(fs::File::open(path)?).read_to_string(&mut text)?;
        Ok(text)
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(codec_for_path("OUT.CSV.GZ").map(|c| c.name()), Some("gzip"));
    }

    #[test]
    fn shuffle_writes_gzip_output() -> Result<()> {
        let lines = numbered_lines(40);
        let input = TempFilePath::with_lines(&lines)?;
        let dir = TempDirPath::new()?;
        let out = dir.file_path("out.csv.gz");
        shuffle_file(input.path(), &out, &ShuffleOptions::default())?;

        let after = split_lines(&gunzip(&out)?);
        csvshuf::testing::assert_header_preserving_shuffle(&lines, &after);
        Ok(())
    }

    #[test]
    fn generate_writes_gzip_output() -> Result<()> {
        let dir = TempDirPath::new()?;
        let out = dir.file_path("gen.csv.gz");
        generate_csv(&out, &GenOptions::new(25, 3).with_seed(4))?;
        assert_eq!(split_lines(&gunzip(&out)?).len(), 25);
        Ok(())
    }

    #[test]
    fn gzip_input_is_refused() -> Result<()> {
        let dir = TempDirPath::new()?;
        let packed = dir.file_path("in.csv.gz");
        generate_csv(&packed, &GenOptions::new(5, 2))?;

        let err = shuffle_file(&packed, dir.file_path("out.csv"), &ShuffleOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("gzip-compressed"));

        // Magic bytes are caught even without the extension.
        let renamed = dir.file_path("in.csv");
        fs::rename(&packed, &renamed)?;
        assert_eq!(sniff_input_codec(&renamed)?, Some("gzip"));
        assert!(shuffle_file(&renamed, dir.file_path("out.csv"), &ShuffleOptions::default()).is_err());
        Ok(())
    }
}

#[cfg(feature = "compression-zstd")]
#[test]
fn shuffle_writes_zstd_output() -> Result<()> {
    let lines = numbered_lines(30);
    let input = TempFilePath::with_lines(&lines)?;
    let dir = TempDirPath::new()?;
    let out = dir.file_path("out.csv.zst");
    shuffle_file(input.path(), &out, &ShuffleOptions::default().with_seed(3))?;

    let raw = zstd::stream::decode_all(fs::File::open(&out)?)?;
    let after = split_lines(&String::from_utf8(raw)?);
    csvshuf::testing::assert_header_preserving_shuffle(&lines, &after);
    Ok(())
}

#[cfg(feature = "compression-bzip2")]
#[test]
fn bzip2_streams_are_sniffed_by_content() -> Result<()> {
    let dir = TempDirPath::new()?;
    for (rows, name) in [(5, "rows"), (0, "empty")] {
        let packed = dir.file_path(&format!("{name}.csv.bz2"));
        generate_csv(&packed, &GenOptions::new(rows, 2))?;
        let renamed = dir.file_path(&format!("{name}.csv"));
        fs::rename(&packed, &renamed)?;
        assert_eq!(sniff_input_codec(&renamed)?, Some("bzip2"), "{name}");
    }
    Ok(())
}
