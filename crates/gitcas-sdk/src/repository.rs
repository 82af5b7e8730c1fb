use std::path::{Path, PathBuf};

use gitcas_refs::file::HEAD_FILE;
use gitcas_refs::{FileRefStore, Head, RefStore};
use gitcas_store::loose::OBJECTS_DIR;
use gitcas_store::{
    Blob, Commit, LooseObjectStore, Object, ObjectKind, ObjectStore, Tree, TreeEntry,
};
use gitcas_types::ObjectId;
use tracing::{debug, info};

use crate::config::RepoConfig;
use crate::error::{SdkError, SdkResult};
use crate::identity::{ConfiguredIdentity, IdentityProvider};
use crate::source::FileProvider;

/// Ids produced by one [`Repository::commit_files`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutcome {
    /// One per source file, in the order the provider returned them.
    pub blobs: Vec<ObjectId>,
    pub tree: ObjectId,
    pub commit: ObjectId,
    /// Branch that now points at `commit`.
    pub branch: String,
}

/// A repository: an object store plus `HEAD` and branch refs under one root.
pub struct Repository<S: ObjectStore = LooseObjectStore> {
    root: PathBuf,
    store: S,
    refs: FileRefStore,
    identity: Box<dyn IdentityProvider>,
}

impl Repository<LooseObjectStore> {
    /// Create the on-disk layout under `root` and open it.
    ///
    /// Creates `objects/info`, `objects/pack`, `refs/heads`, `refs/tags`, and
    /// points `HEAD` at the configured default branch. Running it on an
    /// existing repository keeps everything already there, including `HEAD`.
    pub fn init_store(root: impl AsRef<Path>, config: &RepoConfig) -> SdkResult<Self> {
        let root = root.as_ref();
        let store = LooseObjectStore::init(root, &config.store)?;
        let refs = FileRefStore::init(root)?;

        if refs.head_path().exists() {
            debug!(root = %root.display(), "HEAD already present, leaving it");
        } else {
            refs.set_head(&config.default_branch)?;
        }
        info!(root = %root.display(), branch = %config.default_branch, "store initialized");

        Self::with_store(root, store, config)
    }

    /// Open an existing repository.
    pub fn open(root: impl AsRef<Path>, config: &RepoConfig) -> SdkResult<Self> {
        let root = root.as_ref();
        if !root.join(HEAD_FILE).is_file() || !root.join(OBJECTS_DIR).is_dir() {
            return Err(SdkError::NotInitialized(root.display().to_string()));
        }
        let store = LooseObjectStore::open(root, &config.store)?;
        Self::with_store(root, store, config)
    }
}

impl<S: ObjectStore> Repository<S> {
    /// Assemble a repository over any object store. Refs live under `root`.
    pub fn with_store(root: impl Into<PathBuf>, store: S, config: &RepoConfig) -> SdkResult<Self> {
        let root = root.into();
        Ok(Self {
            refs: FileRefStore::open(root.clone()),
            root,
            store,
            identity: Box::new(ConfiguredIdentity::from_config(&config.identity)?),
        })
    }

    /// Replace the identity commits are attributed to.
    pub fn with_identity(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }

    // ---- Graph construction ----

    /// Store `contents` as a blob.
    pub fn write_blob(&self, contents: &[u8]) -> SdkResult<ObjectId> {
        let id = self
            .store
            .write_object(&Object::Blob(Blob::new(contents.to_vec())))?;
        Ok(id)
    }

    /// Store a tree. Entries may be given in any order.
    pub fn write_tree(&self, entries: Vec<TreeEntry>) -> SdkResult<ObjectId> {
        let tree = Tree::new(entries)?;
        Ok(self.store.write_object(&Object::Tree(tree))?)
    }

    /// Store a root commit (no parent) for `tree`.
    pub fn write_commit(&self, tree: ObjectId, message: &str) -> SdkResult<ObjectId> {
        self.write_commit_with_parent(tree, None, message)
    }

    /// Store a commit for `tree` on top of `parent`.
    pub fn write_commit_with_parent(
        &self,
        tree: ObjectId,
        parent: Option<ObjectId>,
        message: &str,
    ) -> SdkResult<ObjectId> {
        let (author, committer) = self.identity.signatures()?;
        let mut commit = Commit::new(tree, author, committer, message);
        commit.parent = parent;
        Ok(self.store.write_object(&Object::Commit(commit))?)
    }

    /// Record `files` as a new commit on the current branch.
    ///
    /// Blobs, then the tree, then the commit are written; the branch HEAD
    /// names is advanced last. The first failure aborts the run, so the
    /// branch never points at a commit whose tree or blobs are missing.
    pub fn commit_files(
        &self,
        files: &dyn FileProvider,
        message: &str,
    ) -> SdkResult<CommitOutcome> {
        let branch = match self.refs.head()? {
            Some(Head::Symbolic(branch)) => branch,
            Some(Head::Detached(_)) => return Err(SdkError::DetachedHead),
            None => return Err(SdkError::NotInitialized(self.root.display().to_string())),
        };
        let parent = self.refs.read_branch(&branch)?;

        let files = files.files()?;
        let mut blobs = Vec::with_capacity(files.len());
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let id = self.write_blob(&file.contents)?;
            blobs.push(id);
            entries.push(TreeEntry::new(file.mode, file.name, id));
        }

        let tree = self.write_tree(entries)?;
        let commit = self.write_commit_with_parent(tree, parent, message)?;
        self.refs.update_branch(&branch, &commit)?;

        info!(
            %branch,
            %commit,
            %tree,
            files = blobs.len(),
            "commit recorded"
        );
        Ok(CommitOutcome {
            blobs,
            tree,
            commit,
            branch,
        })
    }

    // ---- Reading ----

    /// The commit HEAD resolves to, if any.
    pub fn head_commit(&self) -> SdkResult<Option<ObjectId>> {
        Ok(self.refs.resolve_head()?)
    }

    pub fn read_blob(&self, id: &ObjectId) -> SdkResult<Blob> {
        match self.store.read_object(id)? {
            Object::Blob(blob) => Ok(blob),
            other => Err(unexpected(id, ObjectKind::Blob, &other)),
        }
    }

    pub fn read_tree(&self, id: &ObjectId) -> SdkResult<Tree> {
        match self.store.read_object(id)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(unexpected(id, ObjectKind::Tree, &other)),
        }
    }

    pub fn read_commit(&self, id: &ObjectId) -> SdkResult<Commit> {
        match self.store.read_object(id)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(unexpected(id, ObjectKind::Commit, &other)),
        }
    }
}

fn unexpected(id: &ObjectId, expected: ObjectKind, found: &Object) -> SdkError {
    SdkError::UnexpectedKind {
        id: *id,
        expected,
        found: found.kind(),
    }
}

impl<S: ObjectStore + std::fmt::Debug> std::fmt::Debug for Repository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
