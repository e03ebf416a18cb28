use std::error::Error;
use std::fs;
use std::path::Path;

/// Copies the trunk output into `static/dist`, which the host embeds with
/// `include_dir!`. Without a frontend build the checked-in placeholder page
/// is embedded instead.
fn main() -> Result<(), Box<dyn Error>> {
    let static_dir = Path::new("static");
    let frontend_dist = Path::new("../frontend/dist");

    if frontend_dist.exists() {
        let target = static_dir.join("dist");
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::create_dir_all(static_dir)?;
        let options = fs_extra::dir::CopyOptions::new().overwrite(true);
        fs_extra::dir::copy(frontend_dist, static_dir, &options)?;
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
    println!("cargo:rerun-if-changed=static/dist");
    Ok(())
}
