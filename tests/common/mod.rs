use std::path::Path;

use commitstore::*;

pub fn init_repo(dir: &Path) -> Repository {
    Repository::init(dir).unwrap()
}

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[allow(dead_code)]
pub fn read_file(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

/// Repository with `hello.txt` and `dir/a.txt` committed as "first".
#[allow(dead_code)]
pub fn repo_with_files(dir: &Path) -> Repository {
    let repo = init_repo(dir);
    write_file(dir, "hello.txt", "hello\n");
    write_file(dir, "dir/a.txt", "aaa\n");
    repo.add("hello.txt").unwrap();
    repo.add("dir/a.txt").unwrap();
    repo.commit_at("first", 1_000).unwrap();
    repo
}
