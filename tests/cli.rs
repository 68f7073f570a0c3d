use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};
use zip::ZipArchive;

/// Builds `<parent>/photos` with a top-level file, a Japanese-named sub-directory and Finder litter.
fn photos_fixture() -> (TempDir, PathBuf) {
    let parent = tempdir().unwrap();
    let input = parent.path().join("photos");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("report.docx"), b"quarterly numbers").unwrap();
    fs::create_dir(input.join("招待状")).unwrap();
    fs::write(input.join("招待状").join("guest.txt"), b"alice\nbob\n").unwrap();
    fs::write(input.join(".DS_Store"), b"\0\0\0\x01Bud1").unwrap();
    (parent, input)
}

fn sjzip(temp_root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sjzip").unwrap();
    cmd.env_remove("SJZIP_PASSWORD").arg("--temp-dir").arg(temp_root);
    cmd
}

fn entry_names(zip_path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn read_entry(zip_path: &Path, name: &str, password: Option<&str>) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    let mut file = match password {
        Some(p) => archive.by_name_decrypt(name, p.as_bytes()).unwrap(),
        None => archive.by_name(name).unwrap(),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    buf
}

fn assert_no_staging_left(temp_root: &Path) {
    let leftovers: Vec<_> = fs::read_dir(temp_root).unwrap().map(|e| e.unwrap().path()).collect();
    assert!(leftovers.is_empty(), "staging leftovers: {:?}", leftovers);
}

#[test]
fn test_cli_archives_beside_input_and_drops_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;

    sjzip(temp_root.path())
        .arg(&input)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("adding: report.docx")
                .and(predicate::str::contains("adding: 招待状/"))
                .and(predicate::str::contains("creating zip file..."))
                .and(predicate::str::contains("Generated password").not()),
        );

    let zip_path = parent.path().join("photos.zip");
    assert!(zip_path.is_file());
    assert_eq!(entry_names(&zip_path), vec!["report.docx", "招待状/", "招待状/guest.txt"]);
    assert_eq!(read_entry(&zip_path, "招待状/guest.txt", None), b"alice\nbob\n");

    // source untouched
    assert!(input.join(".DS_Store").is_file());
    assert_eq!(fs::read(input.join("report.docx"))?, b"quarterly numbers");
    assert_no_staging_left(temp_root.path());
    Ok(())
}

#[test]
fn test_cli_generated_password_is_printed_and_works() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;

    let output = sjzip(temp_root.path()).arg("-l").arg("12").arg(&input).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let printed: Vec<&str> = stdout.lines().filter_map(|l| l.strip_prefix("Generated password: ")).collect();
    assert_eq!(printed.len(), 1, "password must be printed exactly once:\n{}", stdout);
    let password = printed[0];
    assert_eq!(password.chars().count(), 12);
    assert!(password.bytes().all(|b| sjzip::password::PASSWORD_ALPHABET.contains(&b)));

    let zip_path = parent.path().join("photos.zip");
    assert_eq!(read_entry(&zip_path, "report.docx", Some(password)), b"quarterly numbers");
    assert_no_staging_left(temp_root.path());
    Ok(())
}

#[test]
fn test_cli_explicit_password_beats_generated() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;

    sjzip(temp_root.path())
        .args(["-p", "open sesame", "-l", "12"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated password").not());

    let zip_path = parent.path().join("photos.zip");
    assert_eq!(read_entry(&zip_path, "招待状/guest.txt", Some("open sesame")), b"alice\nbob\n");
    Ok(())
}

#[test]
fn test_cli_password_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;

    sjzip(temp_root.path()).env("SJZIP_PASSWORD", "from-env").arg(&input).assert().success();

    let zip_path = parent.path().join("photos.zip");
    assert_eq!(read_entry(&zip_path, "report.docx", Some("from-env")), b"quarterly numbers");
    Ok(())
}

#[test]
fn test_cli_rerun_overwrites_previous_archive() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;
    let zip_path = parent.path().join("photos.zip");
    fs::write(&zip_path, b"stale, not a zip")?;

    sjzip(temp_root.path()).arg(&input).assert().success();
    fs::write(input.join("late.txt"), b"late")?;
    sjzip(temp_root.path()).arg(&input).assert().success();

    assert!(entry_names(&zip_path).contains(&"late.txt".to_string()));
    Ok(())
}

#[test]
fn test_cli_trailing_slash_still_lands_beside_input() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;
    let with_slash = format!("{}/", input.display());

    sjzip(temp_root.path()).arg(&with_slash).assert().success();
    assert!(parent.path().join("photos.zip").is_file());
    assert!(!input.join(".zip").exists());
    Ok(())
}

#[test]
fn test_cli_exclude_flag_adds_patterns() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;
    fs::write(input.join("draft.tmp"), b"x")?;
    fs::write(input.join("招待状").join("old.tmp"), b"x")?;

    sjzip(temp_root.path()).args(["-e", "*.tmp"]).arg(&input).assert().success();
    assert_eq!(entry_names(&parent.path().join("photos.zip")), vec!["report.docx", "招待状/", "招待状/guest.txt"]);
    Ok(())
}

#[test]
fn test_cli_missing_input_is_reported_without_side_effects() -> Result<(), Box<dyn std::error::Error>> {
    let parent = tempdir()?;
    let temp_root = tempdir()?;
    let missing = parent.path().join("nowhere");

    sjzip(temp_root.path())
        .arg(&missing)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Input directory does not exist"));
    assert!(!parent.path().join("nowhere.zip").exists());
    assert_no_staging_left(temp_root.path());
    Ok(())
}

#[test]
fn test_cli_file_input_is_reported_without_side_effects() -> Result<(), Box<dyn std::error::Error>> {
    let parent = tempdir()?;
    let temp_root = tempdir()?;
    let file = parent.path().join("notes.txt");
    fs::write(&file, b"x")?;

    sjzip(temp_root.path())
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Input path is not a directory"));
    assert!(!parent.path().join("notes.txt.zip").exists());
    assert_no_staging_left(temp_root.path());
    Ok(())
}

#[test]
fn test_cli_unrepresentable_name_fails_and_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir()?;
    fs::write(input.join("안녕.txt"), b"hangul")?;

    sjzip(temp_root.path())
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("안녕.txt").and(predicate::str::contains("Shift_JIS")));
    assert!(!parent.path().join("photos.zip").exists());
    assert_no_staging_left(temp_root.path());
    Ok(())
}

#[test]
fn test_cli_zero_length_password_is_rejected() {
    let temp_root = tempdir().unwrap();
    sjzip(temp_root.path()).args(["-l", "0", "anything"]).assert().code(2);
}

#[test]
fn test_cli_unknown_encoding_is_a_usage_error() {
    let (parent, input) = photos_fixture();
    let temp_root = tempdir().unwrap();
    sjzip(temp_root.path())
        .args(["--encoding", "klingon"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown encoding 'klingon'"));
    assert!(!parent.path().join("photos.zip").exists());
    assert_no_staging_left(temp_root.path());
}
