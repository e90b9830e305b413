use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available: write the subset the templates use
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; }
.min-h-screen { min-height: 100vh; }
.mx-auto { margin-left: auto; margin-right: auto; }
.max-w-4xl { max-width: 56rem; }
.max-w-md { max-width: 28rem; }
.px-4 { padding-left: 1rem; padding-right: 1rem; }
.py-3 { padding-top: 0.75rem; padding-bottom: 0.75rem; }
.py-8 { padding-top: 2rem; padding-bottom: 2rem; }
.mb-2 { margin-bottom: 0.5rem; }
.mb-4 { margin-bottom: 1rem; }
.mb-8 { margin-bottom: 2rem; }
.flex { display: flex; }
.items-center { align-items: center; }
.justify-center { justify-content: center; }
.justify-between { justify-content: space-between; }
.gap-3 { gap: 0.75rem; }
.text-center { text-align: center; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.font-medium { font-weight: 500; }
.font-semibold { font-weight: 600; }
.font-bold { font-weight: 700; }
.text-stone-500 { color: #78716c; }
.text-stone-900 { color: #1c1917; }
.bg-white { background-color: #fff; }
.bg-stone-50 { background-color: #fafaf9; }
.border-b { border-bottom: 1px solid; }
.border-stone-200 { border-color: #e7e5e4; }
a { color: inherit; text-decoration: none; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; cursor: pointer; }
.btn-primary { background: #1c1917; color: #fff; border: none; }
.btn-secondary { background: #fff; color: #1c1917; border: 1px solid #d6d3d1; }
.card { background: #fff; border-radius: 0.75rem; border: 1px solid #e7e5e4; padding: 1.5rem; }
.input { display: block; width: 100%; border: 1px solid #d6d3d1; border-radius: 0.5rem; padding: 0.25rem 0.5rem; }
.notice { background: #fef2f2; color: #b91c1c; border-radius: 0.5rem; padding: 0.5rem; font-size: 0.875rem; }
.complaint-item { padding: 0.75rem 0; border-bottom: 1px solid #f5f5f4; }
.complaints { width: 100%; border-collapse: collapse; }
.complaints th, .complaints td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #f5f5f4; }
.complaints form { display: inline; }
.status { margin-left: 0.5rem; border-radius: 9999px; padding: 0 0.5rem; font-size: 0.75rem; font-weight: 500; background: #e7e5e4; }
.status.pending { background: #fef3c7; color: #92400e; }
.status.resolved { background: #d1fae5; color: #065f46; }
.small-btn { border: 1px solid #d6d3d1; border-radius: 0.5rem; padding: 0 0.5rem; font-size: 0.875rem; background: #fff; cursor: pointer; }
.small-btn.danger { border-color: #fca5a5; color: #b91c1c; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}
