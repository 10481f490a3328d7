#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::{BranchType, IndexAddOption, Oid, Repository};

pub fn generate_path_to_repo<S>(repo_name: S) -> PathBuf
where
    S: Into<String>,
{
    let repo_name: String = repo_name.into();
    let test_fixture_path = Path::new("./test_sandbox/");
    let path_to_repo = test_fixture_path.join(repo_name);
    assert!(path_to_repo.is_relative());
    path_to_repo
}

pub fn generate_path_to_bare_repo<S>(repo_name: S) -> PathBuf
where
    S: Into<String>,
{
    let repo_name: String = repo_name.into();
    generate_path_to_repo(format!("bare_{}.git", repo_name))
}

pub fn setup_git_repo<S>(repo_name: S) -> Repository
where
    S: Into<String>,
{
    let path_to_repo = generate_path_to_repo(repo_name);

    fs::remove_dir_all(&path_to_repo).ok();
    fs::create_dir_all(&path_to_repo).unwrap();

    let repo = match Repository::init(path_to_repo) {
        Ok(repo) => repo,
        Err(err) => panic!("failed to init repo: {}", err),
    };

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "name").unwrap();
    config.set_str("user.email", "email").unwrap();

    repo
}

pub fn setup_git_bare_repo<S>(repo_name: S) -> Repository
where
    S: Into<String>,
{
    let path_to_bare_repo = generate_path_to_bare_repo(repo_name);

    fs::remove_dir_all(&path_to_bare_repo).ok();
    fs::create_dir_all(&path_to_bare_repo).unwrap();

    match Repository::init_bare(path_to_bare_repo) {
        Ok(repo) => repo,
        Err(err) => panic!("failed to init bare repo: {}", err),
    }
}

pub fn teardown_git_repo<S>(repo_name: S)
where
    S: Into<String>,
{
    let path_to_repo = generate_path_to_repo(repo_name);
    fs::remove_dir_all(&path_to_repo).ok();
}

pub fn teardown_git_bare_repo<S>(repo_name: S)
where
    S: Into<String>,
{
    let path_to_repo = generate_path_to_bare_repo(repo_name);
    fs::remove_dir_all(&path_to_repo).ok();
}

pub fn create_branch(repo: &Repository, branch_name: &str) {
    // create branch from HEAD
    let oid = repo.head().unwrap().target().unwrap();
    let commit = repo.find_commit(oid).unwrap();

    repo.branch(branch_name, &commit, false).unwrap();
}

pub fn checkout_branch(repo: &Repository, branch_name: &str) {
    let obj = repo
        .revparse_single(&("refs/heads/".to_owned() + branch_name))
        .unwrap();

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(&obj, Some(&mut checkout)).unwrap();

    repo.set_head(&("refs/heads/".to_owned() + branch_name))
        .unwrap();
}

pub fn branch_tip(repo: &Repository, branch_name: &str) -> Oid {
    repo.find_branch(branch_name, BranchType::Local)
        .unwrap()
        .get()
        .peel_to_commit()
        .unwrap()
        .id()
}

pub fn first_parent(repo: &Repository, oid: Oid) -> Oid {
    repo.find_commit(oid).unwrap().parent_id(0).unwrap()
}

pub fn commit_summary(repo: &Repository, oid: Oid) -> String {
    repo.find_commit(oid)
        .unwrap()
        .summary()
        .unwrap()
        .to_string()
}

pub fn stage_everything(repo: &Repository) -> Oid {
    let mut index = repo.index().expect("cannot get the Index file");
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();

    let mut index = repo.index().unwrap();
    // root_tree_oid
    index.write_tree().unwrap()
}

pub fn create_first_commit(repo: &Repository, root_tree_oid: Oid, message: &str) {
    let tree = repo.find_tree(root_tree_oid).unwrap();

    let author = &repo.signature().unwrap();
    let committer = &author;

    repo.commit(Some("HEAD"), author, committer, message, &tree, &[])
        .unwrap();
}

pub fn create_commit(repo: &Repository, root_tree_oid: Oid, message: &str) {
    let tree = repo.find_tree(root_tree_oid).unwrap();
    let head_id = repo.refname_to_id("HEAD").unwrap();
    let parent = repo.find_commit(head_id).unwrap();

    let author = &repo.signature().unwrap();
    let committer = &author;

    repo.commit(Some("HEAD"), author, committer, message, &tree, &[&parent])
        .unwrap();
}

pub fn first_commit_all(repo: &Repository, message: &str) {
    // HEAD should not resolve to anything prior to creating the first commit
    assert!(repo.head().is_err());

    // stage all changes - git add -A *
    let root_tree_oid = stage_everything(repo);

    create_first_commit(repo, root_tree_oid, message);
}

pub fn commit_all(repo: &Repository, message: &str) {
    // stage all changes - git add -A *
    let root_tree_oid = stage_everything(repo);

    create_commit(repo, root_tree_oid, message);
}

/// git commit --amend -a -m <message>
pub fn amend_all(repo: &Repository, message: &str) -> Oid {
    let root_tree_oid = stage_everything(repo);
    let tree = repo.find_tree(root_tree_oid).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();

    head.amend(Some("HEAD"), None, None, None, Some(message), Some(&tree))
        .unwrap()
}

pub fn get_current_branch_name(repo: &Repository) -> String {
    let head = repo.head().unwrap();
    head.shorthand().unwrap().to_string()
}

pub fn create_new_file(path_to_repo: &Path, file_name: &str, file_contents: &str) {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_to_repo.join(file_name))
        .unwrap();

    writeln!(file, "{}", file_contents).unwrap();
}

pub fn overwrite_file(path_to_repo: &Path, file_name: &str, file_contents: &str) {
    fs::write(path_to_repo.join(file_name), format!("{}\n", file_contents)).unwrap();
}

pub fn read_file(path_to_repo: &Path, file_name: &str) -> String {
    fs::read_to_string(path_to_repo.join(file_name)).unwrap()
}

pub fn append_file(path_to_repo: &Path, file_name: &str, file_contents: &str) {
    let mut file = OpenOptions::new()
        .write(true)
        .append(true)
        .open(path_to_repo.join(file_name))
        .unwrap();

    writeln!(file, "{}", file_contents).unwrap();
}

/// A linear chain `a <- b <- c <- d` built on `first commit`, where the
/// commit of branch `a` was amended afterwards.
///
/// `a` carries the amended commit and `d` is checked out. When
/// `conflicting` is set, the commit of `c` edits the same line the amend did.
pub struct ChainFixture {
    pub repo: Repository,
    pub path_to_repo: PathBuf,
    pub old_target: Oid,
    pub new_target: Oid,
}

pub fn setup_chain_fixture(repo_name: &str, conflicting: bool) -> ChainFixture {
    let repo = setup_git_repo(repo_name);
    let path_to_repo = generate_path_to_repo(repo_name);

    {
        create_new_file(&path_to_repo, "hello_world.txt", "Hello, world!");
        first_commit_all(&repo, "first commit");
    };

    {
        create_branch(&repo, "a");
        checkout_branch(&repo, "a");
        create_new_file(&path_to_repo, "lib.txt", "v1");
        commit_all(&repo, "target change");
    };
    let old_target = branch_tip(&repo, "a");

    {
        create_branch(&repo, "b");
        checkout_branch(&repo, "b");
        append_file(&path_to_repo, "hello_world.txt", "fixed typo");
        commit_all(&repo, "fixTypo");
    };

    {
        create_branch(&repo, "c");
        checkout_branch(&repo, "c");
        if conflicting {
            overwrite_file(&path_to_repo, "lib.txt", "v1 with x");
        } else {
            create_new_file(&path_to_repo, "file_x.txt", "feature x");
        }
        commit_all(&repo, "featX");
    };

    {
        create_branch(&repo, "d");
        checkout_branch(&repo, "d");
        create_new_file(&path_to_repo, "file_y.txt", "feature y");
        commit_all(&repo, "featY");
    };

    // amend the commit of a
    {
        checkout_branch(&repo, "a");
        overwrite_file(&path_to_repo, "lib.txt", "v2");
        amend_all(&repo, "target change");
    };
    let new_target = branch_tip(&repo, "a");

    checkout_branch(&repo, "d");
    assert_eq!(&get_current_branch_name(&repo), "d");

    ChainFixture {
        repo,
        path_to_repo,
        old_target,
        new_target,
    }
}

pub fn run_test_bin<I, T, P: AsRef<Path>>(current_dir: P, arguments: I) -> Output
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let mut current_dir_buf: PathBuf = current_dir.as_ref().into();
    if current_dir_buf.is_relative() {
        current_dir_buf = current_dir_buf.canonicalize().unwrap();
    }

    assert_cmd::Command::cargo_bin(env!("CARGO_PKG_NAME"))
        .expect("Failed to get git-rebase-chain")
        .current_dir(current_dir_buf)
        .env_remove("RUST_LOG")
        .args(arguments)
        .output()
        .expect("Failed to run git-rebase-chain")
}

pub fn run_test_bin_expect_err<I, T, P: AsRef<Path>>(current_dir: P, arguments: I) -> Output
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let output = run_test_bin(current_dir, arguments);

    if output.status.success() {
        io::stdout().write_all(&output.stdout).unwrap();
        io::stderr().write_all(&output.stderr).unwrap();
    }

    assert!(!output.status.success(), "expect err");

    output
}

pub fn run_test_bin_expect_ok<I, T, P: AsRef<Path>>(current_dir: P, arguments: I) -> Output
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let output = run_test_bin(current_dir, arguments);

    if !output.status.success() {
        io::stdout().write_all(&output.stdout).unwrap();
        io::stderr().write_all(&output.stderr).unwrap();
    }

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).is_empty());

    output
}

pub fn display_outputs(output: &Output) {
    io::stdout().write_all(&output.stdout).unwrap();
    io::stderr().write_all(&output.stderr).unwrap();
}

pub fn stdout_of(output: &Output) -> String {
    console::strip_ansi_codes(&String::from_utf8_lossy(&output.stdout)).to_string()
}

pub fn stderr_of(output: &Output) -> String {
    console::strip_ansi_codes(&String::from_utf8_lossy(&output.stderr)).to_string()
}

pub fn run_git_command<P: AsRef<Path>>(current_dir: P, arguments: Vec<&str>) -> Output {
    let mut current_dir_buf: PathBuf = current_dir.as_ref().into();
    if current_dir_buf.is_relative() {
        current_dir_buf = current_dir_buf.canonicalize().unwrap();
    }

    let output = Command::new("git")
        .current_dir(current_dir_buf)
        .args(arguments)
        .output()
        .expect("Failed to run git");

    if !output.status.success() {
        display_outputs(&output);
    }
    assert!(output.status.success());

    output
}

pub fn add_bare_remote(repo_name: &str, path_to_repo: &Path) {
    let _bare_repo = setup_git_bare_repo(repo_name);

    let path_to_bare_repo = {
        let mut path_to_bare_repo_buf: PathBuf = generate_path_to_bare_repo(repo_name);
        if path_to_bare_repo_buf.is_relative() {
            path_to_bare_repo_buf = path_to_bare_repo_buf.canonicalize().unwrap();
        }

        path_to_bare_repo_buf.to_str().unwrap().to_string()
    };

    run_git_command(
        path_to_repo,
        vec!["remote", "add", "origin", &path_to_bare_repo],
    );
}

pub fn install_bare_hook(repo_name: &str, hook_name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path_to_hook = generate_path_to_bare_repo(repo_name)
        .join("hooks")
        .join(hook_name);
    fs::create_dir_all(path_to_hook.parent().unwrap()).unwrap();
    fs::write(&path_to_hook, script).unwrap();
    fs::set_permissions(&path_to_hook, fs::Permissions::from_mode(0o755)).unwrap();
}

pub fn remove_bare_hook(repo_name: &str, hook_name: &str) {
    let path_to_hook = generate_path_to_bare_repo(repo_name)
        .join("hooks")
        .join(hook_name);
    fs::remove_file(path_to_hook).unwrap();
}
