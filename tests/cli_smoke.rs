use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_artboard")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "artboard.exe"
            } else {
                "artboard"
            });
            p
        })
}

#[test]
fn cli_lists_templates() {
    let out = std::process::Command::new(exe())
        .arg("templates")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("travel-dubai"));
    assert!(stdout.contains("logo-text-mono"));
}

#[test]
fn cli_exports_template_to_png() {
    let dir = PathBuf::from("target").join("cli_smoke_export");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let status = std::process::Command::new(exe())
        .args([
            "export",
            "--template",
            "logo-icon-badge",
            "--format",
            "png",
            "--width",
            "64",
            "--height",
            "64",
            "--out",
        ])
        .arg(&dir)
        .status()
        .unwrap();
    assert!(status.success());

    let delivered: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("design_") && n.ends_with(".png"))
        .collect();
    assert_eq!(delivered.len(), 1, "found: {delivered:?}");
}

#[test]
fn cli_export_of_saved_scene_roundtrips() {
    let dir = PathBuf::from("target").join("cli_smoke_scene");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let scene = artboard::TemplateCatalog::builtin()
        .select("travel-beach")
        .unwrap();
    let scene_path = dir.join("scene.json");
    std::fs::write(&scene_path, scene.to_json().unwrap()).unwrap();

    let status = std::process::Command::new(exe())
        .args(["export", "--in"])
        .arg(&scene_path)
        .args(["--format", "jpg", "--width", "120", "--height", "63", "--out"])
        .arg(&dir)
        .status()
        .unwrap();
    assert!(status.success());

    let delivered = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().ends_with(".jpg"))
        .expect("jpg delivered");
    let img = image::open(delivered.path()).unwrap();
    assert_eq!((img.width(), img.height()), (120, 63));
}
