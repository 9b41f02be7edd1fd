// Copies the static site (page, styles, scene.toml, wasm pkg) to `dist/`.
use std::{fs, io, path::Path};

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if path.is_dir() {
            copy_dir(&path, &dst_path)?;
        } else {
            fs::copy(&path, &dst_path)?;
        }
    }
    Ok(())
}

fn main() {
    // scene.toml is embedded with include_str!, so edits must rebuild.
    println!("cargo:rerun-if-changed=static");

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }

    let static_dir = Path::new("static");
    if static_dir.exists() {
        if let Err(e) = copy_dir(static_dir, out_dir) {
            println!("cargo:warning=copying static/ to dist/ failed: {e}");
        }
    }
}
