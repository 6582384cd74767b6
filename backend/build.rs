use std::fs;
use std::path::Path;

const PLACEHOLDER_INDEX: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head><meta charset=\"utf-8\"><title>PDF Query</title></head>
<body>
<h1>PDF Query</h1>
<p>The web interface has not been built. Run <code>trunk build --release</code> in
<code>frontend/</code> and rebuild the backend. The JSON API is available under <code>/api</code>.</p>
</body>
</html>
";

fn main() {
    let out_dir = Path::new("static");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.exists() {
        let _ = fs::remove_dir_all(out_dir);
        fs::create_dir_all(out_dir).unwrap();
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true).copy_inside(true),
        )
            .unwrap();
    }

    // include_dir! needs the directory to exist even without a frontend build.
    let embedded = out_dir.join("dist");
    if !embedded.join("index.html").exists() {
        fs::create_dir_all(&embedded).unwrap();
        fs::write(embedded.join("index.html"), PLACEHOLDER_INDEX).unwrap();
    }

    println!("cargo:rerun-if-changed=../frontend/dist");
}
