//! Extension-based content classification.

use std::path::Path;

use bigdirs_core::ContentCategory;

/// Compound suffixes checked before the plain extension, so rotated logs
/// count as logs rather than archives.
const COMPOUND_SUFFIXES: &[(&str, ContentCategory)] = &[
    (".log.gz", ContentCategory::Log),
    (".log.bz2", ContentCategory::Log),
    (".log.xz", ContentCategory::Log),
];

/// Classify a file by name. Pure, case-insensitive, never touches the disk.
pub fn classify(file_name: &str) -> ContentCategory {
    let lower = file_name.to_ascii_lowercase();

    for (suffix, category) in COMPOUND_SUFFIXES {
        if lower.len() > suffix.len() && lower.ends_with(suffix) {
            return *category;
        }
    }

    let Some(ext) = Path::new(&lower).extension().and_then(|e| e.to_str()) else {
        return ContentCategory::Other;
    };
    classify_extension(ext)
}

/// Classify a bare, already lowercased extension (without the dot).
pub fn classify_extension(ext: &str) -> ContentCategory {
    use ContentCategory::*;

    match ext {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "tif" | "raw" | "webp" | "heic"
        | "heif" | "svg" | "ico" | "psd" => Image,
        "mp4" | "mov" | "avi" | "mkv" | "flv" | "wmv" | "webm" | "m4v" | "mpg" | "mpeg" => Video,
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "wma" | "opus" => Audio,
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" | "zst" | "tgz" => Archive,
        "pdf" | "doc" | "docx" | "txt" | "rtf" | "odt" | "md" | "epub" => Document,
        "exe" | "dll" | "so" | "dylib" | "bin" | "dmg" | "pkg" | "apk" | "msi" | "deb" | "rpm" => {
            Application
        }
        "go" | "c" | "cpp" | "h" | "hpp" | "js" | "ts" | "py" | "java" | "sh" | "rb" | "php"
        | "rs" | "cs" | "kt" | "swift" => Code,
        "log" | "trace" | "dump" => Log,
        "sql" | "db" | "sqlite" | "sqlite3" | "mdb" | "accdb" | "ndb" | "frm" | "ibd" => Database,
        "bak" | "backup" | "bkp" | "ab" => Backup,
        "iso" | "img" | "vhd" | "vhdx" | "vmdk" | "dsk" | "qcow2" => DiskImage,
        "conf" | "cfg" | "ini" | "yaml" | "yml" | "json" | "xml" | "toml" => Configuration,
        "ttf" | "otf" | "woff" | "woff2" | "eot" => Font,
        "html" | "htm" | "css" | "scss" | "less" => Web,
        "ods" | "xls" | "xlsx" | "csv" => Spreadsheet,
        "odp" | "ppt" | "pptx" => Presentation,
        _ => Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(classify("photo.jpg"), ContentCategory::Image);
        assert_eq!(classify("movie.mkv"), ContentCategory::Video);
        assert_eq!(classify("song.flac"), ContentCategory::Audio);
        assert_eq!(classify("bundle.tar"), ContentCategory::Archive);
        assert_eq!(classify("report.pdf"), ContentCategory::Document);
        assert_eq!(classify("setup.exe"), ContentCategory::Application);
        assert_eq!(classify("main.go"), ContentCategory::Code);
        assert_eq!(classify("app.log"), ContentCategory::Log);
        assert_eq!(classify("data.sqlite3"), ContentCategory::Database);
        assert_eq!(classify("home.bak"), ContentCategory::Backup);
        assert_eq!(classify("ubuntu.iso"), ContentCategory::DiskImage);
        assert_eq!(classify("settings.toml"), ContentCategory::Configuration);
        assert_eq!(classify("font.woff2"), ContentCategory::Font);
        assert_eq!(classify("index.html"), ContentCategory::Web);
        assert_eq!(classify("budget.xlsx"), ContentCategory::Spreadsheet);
        assert_eq!(classify("deck.pptx"), ContentCategory::Presentation);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("IMG_0001.JPG"), ContentCategory::Image);
        assert_eq!(classify("Archive.ZIP"), ContentCategory::Archive);
    }

    #[test]
    fn test_unknown_and_missing_extensions() {
        assert_eq!(classify("README"), ContentCategory::Other);
        assert_eq!(classify("thing.unknownext"), ContentCategory::Other);
        assert_eq!(classify(".bashrc"), ContentCategory::Other);
        assert_eq!(classify(""), ContentCategory::Other);
    }

    #[test]
    fn test_rotated_logs() {
        assert_eq!(classify("syslog.log.gz"), ContentCategory::Log);
        assert_eq!(classify("app.LOG.BZ2"), ContentCategory::Log);
        assert_eq!(classify("plain.gz"), ContentCategory::Archive);
    }
}
