//! Repository lifecycle integration tests.

use std::fs;

use minigit::objects::ObjectType;
use minigit::{Error, Repository, Signature, TreeBuilder};
use tempfile::TempDir;

fn set_identity(repo: &Repository) {
    fs::write(
        repo.git_dir().join("config"),
        "[user]\n\tname = Test User\n\temail = test@example.com\n",
    )
    .unwrap();
}

#[test]
fn init_then_open_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("project");

    let repo = Repository::init(&path).unwrap();
    assert!(repo.git_dir().join("HEAD").is_file());

    let reopened = Repository::open(&path).unwrap();
    assert_eq!(reopened.git_dir(), repo.git_dir());
    assert_eq!(
        reopened.refs().current_branch().unwrap(),
        Some("master".to_string())
    );
}

#[test]
fn init_twice_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("project");

    Repository::init(&path).unwrap();
    assert!(matches!(
        Repository::init(&path),
        Err(Error::AlreadyARepository(_))
    ));
}

#[test]
fn open_outside_any_repository_fails() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        Repository::open(temp.path()),
        Err(Error::NotARepository(_))
    ));
    assert!(matches!(
        Repository::discover(temp.path()),
        Err(Error::NotARepository(_))
    ));
}

#[test]
fn fresh_repository_has_no_resolvable_branch() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path().join("project")).unwrap();

    // HEAD points at master, but the branch is unborn until the first commit
    assert!(matches!(
        repo.refs().resolve("master"),
        Err(Error::RefNotFound(_))
    ));
}

#[test]
fn initial_commit_end_to_end() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path().join("project")).unwrap();
    set_identity(&repo);

    let oid = repo.create_initial_commit().unwrap();
    let commit = repo.find_commit(&oid).unwrap();

    assert!(commit.is_root());
    assert_eq!(commit.summary(), "Initial commit");
    assert_eq!(commit.author().name(), "Test User");
    assert_eq!(commit.author().email(), "test@example.com");

    // The empty tree backs the commit and the branch now resolves
    let tree = repo.find_tree(commit.tree()).unwrap();
    assert!(tree.is_empty());
    assert_eq!(repo.refs().resolve("master").unwrap().oid, oid);
}

#[test]
fn initial_commit_without_identity_leaves_repo_untouched() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path().join("project")).unwrap();

    assert!(matches!(
        repo.create_initial_commit(),
        Err(Error::MissingIdentity)
    ));
    assert!(matches!(
        repo.refs().resolve("master"),
        Err(Error::RefNotFound(_))
    ));
}

#[test]
fn dangling_ref_update_preserves_previous_mapping() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path().join("project")).unwrap();
    set_identity(&repo);

    let first = repo.create_initial_commit().unwrap();

    let missing: minigit::Oid = "1111111111111111111111111111111111111111"
        .parse()
        .unwrap();
    let result = repo.refs().update("master", &missing, &repo.objects());
    assert!(matches!(result, Err(Error::DanglingReference(_))));

    assert_eq!(repo.refs().resolve("master").unwrap().oid, first);
}

#[test]
fn commit_chain_via_public_api() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path().join("project")).unwrap();
    set_identity(&repo);

    let root = repo.create_initial_commit().unwrap();

    let store = repo.objects();
    let blob = store.write(ObjectType::Blob, b"hello\n").unwrap();
    let mut builder = TreeBuilder::new();
    builder.insert(minigit::FileMode::Regular, "hello.txt", blob);
    let tree = builder.build(&store).unwrap();

    let sig = Signature::new("Test User", "test@example.com", 1700000100, 0);
    let second = repo
        .create_commit(&tree, &[root], &sig, &sig, "Add hello.txt")
        .unwrap();
    repo.update_head(&second).unwrap();

    let head = repo.refs().resolve("HEAD").unwrap();
    assert_eq!(head.oid, second);

    let commit = repo.find_commit(&second).unwrap();
    assert_eq!(commit.parent(), Some(&root));
    assert_eq!(commit.summary(), "Add hello.txt");
}
