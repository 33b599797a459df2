//! Test registration.
//!
//! A [`Registry`] maps group names to [`Group`]s in registration order.
//! Registration is append only: every call upserts the target group and then
//! overwrites a hook, sets the sync flag, or appends a test. Nothing is ever removed.
//!
//! The default group ([`DEFAULT_GROUP`]) always exists, so tests registered
//! without a group name always have somewhere to go.

use std::{
    borrow::Cow,
    fmt::{self, Display},
    future::Future,
};

use crate::{
    context::{HookContext, TestContext},
    test::{HookFnHandle, Test, TestFnHandle},
};

/// Name of the group used when no group name is given.
pub const DEFAULT_GROUP: &str = "Default";

/// Name of the debug group.
///
/// If this group has tests, a run executes only this group and always reports failure.
pub const DEBUG_GROUP: &str = "Debug";

/// Strongly typed name of a test group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupName(Cow<'static, str>);

impl GroupName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn debug() -> Self {
        Self(Cow::Borrowed(DEBUG_GROUP))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_debug(&self) -> bool {
        self.0 == DEBUG_GROUP
    }
}

impl Default for GroupName {
    fn default() -> Self {
        Self(Cow::Borrowed(DEFAULT_GROUP))
    }
}

impl From<&'static str> for GroupName {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for GroupName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named collection of tests sharing hooks and an execution mode.
#[derive(Debug, Default, Clone)]
pub struct Group {
    before: Option<HookFnHandle>,
    after: Option<HookFnHandle>,
    sync: bool,
    tests: Vec<Test>,
}

impl Group {
    pub fn before(&self) -> Option<&HookFnHandle> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&HookFnHandle> {
        self.after.as_ref()
    }

    /// Whether tests of this group run strictly one after another.
    pub fn is_sync(&self) -> bool {
        self.sync
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// The explicitly owned store of every registered group.
///
/// Build one up front, then hand it to a [`Runner`](crate::runner::Runner)
/// or [`run`](crate::run).
#[derive(Debug, Clone)]
pub struct Registry {
    groups: Vec<(GroupName, Group)>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            groups: vec![(GroupName::default(), Group::default())],
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the registration methods to a fixed group.
    pub fn group(&mut self, name: impl Into<GroupName>) -> GroupHandle<'_> {
        GroupHandle {
            registry: self,
            name: name.into(),
        }
    }

    /// Register a test in the default group.
    pub fn test<F, Fut>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(TestContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.group(GroupName::default()).test(name, f);
        self
    }

    /// Set the before hook of the default group.
    pub fn before<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.group(GroupName::default()).before(f);
        self
    }

    /// Set the after hook of the default group.
    pub fn after<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.group(GroupName::default()).after(f);
        self
    }

    /// Run the tests of the default group sequentially.
    pub fn sync(&mut self) -> &mut Self {
        self.group(GroupName::default()).sync();
        self
    }

    pub fn get(&self, name: &GroupName) -> Option<&Group> {
        self.groups
            .iter()
            .find_map(|(key, group)| (key == name).then_some(group))
    }

    /// Iterate all groups in registration order, the default group first.
    pub fn groups(&self) -> impl ExactSizeIterator<Item = (&GroupName, &Group)> {
        self.groups.iter().map(|(name, group)| (name, group))
    }

    /// Total number of registered tests across all groups.
    pub fn test_count(&self) -> usize {
        self.groups.iter().map(|(_, group)| group.tests.len()).sum()
    }

    fn upsert(&mut self, name: &GroupName) -> &mut Group {
        let idx = match self.groups.iter().position(|(key, _)| key == name) {
            Some(idx) => idx,
            None => {
                self.groups.push((name.clone(), Group::default()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }
}

/// Registration methods bound to one group, see [`Registry::group`].
#[derive(Debug)]
pub struct GroupHandle<'r> {
    registry: &'r mut Registry,
    name: GroupName,
}

impl GroupHandle<'_> {
    pub fn name(&self) -> &GroupName {
        &self.name
    }

    pub fn test<F, Fut>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(TestContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.test_in(name, f, self.name.clone())
    }

    /// Register a test in `group` instead of the bound group.
    ///
    /// Passing [`GroupName::debug()`] moves a single test into the debug group
    /// without rewriting its registration.
    pub fn test_in<F, Fut>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        f: F,
        group: impl Into<GroupName>,
    ) -> &mut Self
    where
        F: Fn(TestContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let group = group.into();
        let test = Test::new(name, group.clone(), TestFnHandle::new(f));
        self.registry.upsert(&group).tests.push(test);
        self
    }

    /// Set the before hook, replacing a previously registered one.
    pub fn before<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.before_in(f, self.name.clone())
    }

    /// Set the before hook of `group` instead of the bound group.
    pub fn before_in<F, Fut>(&mut self, f: F, group: impl Into<GroupName>) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.registry.upsert(&group.into()).before = Some(HookFnHandle::new(f));
        self
    }

    /// Set the after hook, replacing a previously registered one.
    pub fn after<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.after_in(f, self.name.clone())
    }

    /// Set the after hook of `group` instead of the bound group.
    pub fn after_in<F, Fut>(&mut self, f: F, group: impl Into<GroupName>) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.registry.upsert(&group.into()).after = Some(HookFnHandle::new(f));
        self
    }

    pub fn sync(&mut self) -> &mut Self {
        self.registry.upsert(&self.name).sync = true;
        self
    }
}
