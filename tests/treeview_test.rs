use anyhow::Result;
use cli_toolbox::core::treeview::{ignored_set, render_tree, DEFAULT_EXTRA_IGNORES};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_renders_nested_project() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path();
    fs::create_dir_all(root.join("docs"))?;
    fs::create_dir_all(root.join("src/bin"))?;
    fs::create_dir_all(root.join("target/debug"))?;
    fs::create_dir_all(root.join(".venv/lib"))?;
    fs::write(root.join("docs/guide.md"), "")?;
    fs::write(root.join("src/bin/main.rs"), "")?;
    fs::write(root.join("src/lib.rs"), "")?;
    fs::write(root.join("Cargo.toml"), "")?;

    let ignored = ignored_set(DEFAULT_EXTRA_IGNORES.iter().copied().chain(["target"]));
    let lines = render_tree(root, &ignored)?;

    assert_eq!(
        lines,
        vec![
            "├── Cargo.toml",
            "├── docs",
            "│   └── guide.md",
            "└── src",
            "    ├── bin",
            "    │   └── main.rs",
            "    └── lib.rs",
        ]
    );
    Ok(())
}

#[test]
fn test_file_is_not_a_folder() -> Result<()> {
    let dir = TempDir::new()?;
    let file = dir.path().join("notes.txt");
    fs::write(&file, "")?;
    assert!(render_tree(&file, &ignored_set(Vec::<String>::new())).is_err());
    Ok(())
}
