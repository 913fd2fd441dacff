use chrono::{Local, NaiveDate, TimeZone};
use magazine_report::core::ConfigProvider;
use magazine_report::{
    scan_main_folder, CliConfig, EtlEngine, EtlError, LocalStorage, ReportPipeline,
    ScanSettings, TomlConfig,
};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

fn at(y: i32, m: u32, d: u32, h: u32) -> SystemTime {
    Local
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap()
        .into()
}

fn write_dat(dir: &Path, name: &str, content: &str, modified: SystemTime) {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

/// Two production lines, a retry duplicate, a corrupt file and some clutter.
fn build_tree(root: &Path) {
    let line_a = root.join("line-a");
    let line_b = root.join("line-b");

    write_dat(&line_a, "7_01022024_1_1.dat", "h|h|h|h|h\nA|B|C|10|20|D|E\n", at(2024, 2, 3, 8));
    write_dat(&line_a, "7_01022024_2_1.dat", "A|B|C|11|21|D|E\n", at(2024, 2, 3, 17));
    write_dat(&line_a, "7_02022024_1_1.dat", "", at(2024, 2, 3, 9));
    fs::write(line_a.join("readme.txt"), "not data").unwrap();

    write_dat(&line_b, "12_01022024_1_1.dat", "x|5|6|y|z", at(2024, 2, 4, 6));
    fs::create_dir_all(line_b.join("archive")).unwrap();

    fs::write(root.join("9_01022024_1_1.dat"), "top|level|is|ignored").unwrap();
}

fn cli_config(main_folder: &Path, output: &Path) -> CliConfig {
    CliConfig {
        main_folder: Some(main_folder.to_str().unwrap().to_string()),
        output_path: output.to_str().unwrap().to_string(),
        archive_name: "report.zip".to_string(),
        extension: "dat".to_string(),
        delimiter: '|',
        no_json: false,
        verbose: false,
        json_logs: false,
    }
}

#[test]
fn test_scan_reconciles_tree() {
    let dir = TempDir::new().unwrap();
    build_tree(dir.path());

    let index = scan_main_folder(dir.path(), &ScanSettings::default()).unwrap();
    assert_eq!(index.record_count(), 3);

    let feb3 = index
        .get(&NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
        .unwrap();
    assert_eq!(feb3.len(), 2);

    assert_eq!(feb3[0].file_name, "7_01022024_2_1.dat");
    assert_eq!(feb3[0].date_from_filename.to_string(), "01/02/2024");
    assert_eq!(feb3[0].in_value, "11");
    assert_eq!(feb3[0].out_value, "21");

    assert_eq!(feb3[1].file_name, "7_02022024_1_1.dat");
    assert_eq!(feb3[1].in_value, "");
    assert_eq!(feb3[1].out_value, "");

    let feb4 = index
        .get(&NaiveDate::from_ymd_opt(2024, 2, 4).unwrap())
        .unwrap();
    assert_eq!(feb4[0].magazine_code, "12");
    assert_eq!(feb4[0].in_value, "5");
    assert_eq!(feb4[0].out_value, "6");
}

#[tokio::test]
async fn test_end_to_end_report_archive() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    build_tree(data.path());

    let config = cli_config(data.path(), out.path());
    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new(ReportPipeline::new(storage, config));

    let output_path = engine.run().await.unwrap();
    assert!(output_path.ends_with("report.zip"));

    let bytes = fs::read(out.path().join("report.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["2024-02-03.csv", "2024-02-04.csv", "report.json"]);

    let mut table = String::new();
    archive
        .by_name("2024-02-03.csv")
        .unwrap()
        .read_to_string(&mut table)
        .unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Modification Date,File Name,Magazine Code,Date From Filename,In Value,Out Value",
            "2024-02-03,7_01022024_2_1.dat,7,01/02/2024,11,21",
            "2024-02-03,7_02022024_1_1.dat,7,02/02/2024,,",
        ]
    );

    let mut json = String::new();
    archive
        .by_name("report.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["2024-02-04"][0]["file_name"], "12_01022024_1_1.dat");
}

#[tokio::test]
async fn test_missing_main_folder_aborts_without_output() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let config = cli_config(&data.path().join("does-not-exist"), out.path());
    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new(ReportPipeline::new(storage, config));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::Scan { .. }));
    assert!(!out.path().join("report.zip").exists());
}

#[tokio::test]
async fn test_toml_config_drives_custom_layout() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_dat(
        &data.path().join("lab"),
        "3_15052024_0_0.txt",
        "a;b;c;40;50\n",
        at(2024, 5, 16, 12),
    );
    write_dat(
        &data.path().join("lab"),
        "3_15052024_0_0.dat",
        "a|b|c|1|2\n",
        at(2024, 5, 16, 12),
    );

    let mut scan = toml::Table::new();
    scan.insert("main_folder".into(), data.path().to_str().unwrap().into());
    scan.insert("extension".into(), "txt".into());
    scan.insert("delimiter".into(), ";".into());
    scan.insert("in_offset".into(), toml::Value::Integer(2));
    scan.insert("out_offset".into(), toml::Value::Integer(1));

    let mut load = toml::Table::new();
    load.insert("output_path".into(), out.path().to_str().unwrap().into());
    load.insert("archive_name".into(), "lab.zip".into());
    load.insert("include_json".into(), false.into());

    let mut report = toml::Table::new();
    report.insert("name".into(), "lab".into());

    let mut root = toml::Table::new();
    root.insert("report".into(), report.into());
    root.insert("scan".into(), scan.into());
    root.insert("load".into(), load.into());

    // serialized through toml so backslashes in temp paths are escaped
    let toml_content = toml::to_string(&root).unwrap();
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new(ReportPipeline::new(storage, config));
    let index = engine.preview().await.unwrap();

    assert_eq!(index.record_count(), 1);
    let (_, records) = index.iter().next().unwrap();
    assert_eq!(records[0].file_name, "3_15052024_0_0.txt");
    assert_eq!(records[0].in_value, "40");
    assert_eq!(records[0].out_value, "50");

    engine.run().await.unwrap();
    let bytes = fs::read(out.path().join("lab.zip")).unwrap();
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);
}

#[test]
fn test_repeated_scans_match() {
    let dir = TempDir::new().unwrap();
    build_tree(dir.path());

    let settings = ScanSettings::default();
    let first = scan_main_folder(dir.path(), &settings).unwrap();
    let second = scan_main_folder(dir.path(), &settings).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
