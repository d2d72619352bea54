//! Closed set of modules the app knows about, with typed lookup.

use crate::modules::{ExampleModule, MobileModule};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use userscript_dom::DomWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Example,
    Mobile,
}

impl ModuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Example => "example",
            ModuleKind::Mobile => "mobile",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Module<H: DomWriter> {
    Example(Arc<ExampleModule<H>>),
    Mobile(Arc<MobileModule<H>>),
}

impl<H: DomWriter> Module<H> {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Module::Example(_) => ModuleKind::Example,
            Module::Mobile(_) => ModuleKind::Mobile,
        }
    }
}

impl<H: DomWriter> Clone for Module<H> {
    fn clone(&self) -> Self {
        match self {
            Module::Example(m) => Module::Example(Arc::clone(m)),
            Module::Mobile(m) => Module::Mobile(Arc::clone(m)),
        }
    }
}

impl<H: DomWriter> fmt::Debug for Module<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Module").field(&self.kind()).finish()
    }
}

/// A module type stored in the registry under a fixed kind.
pub trait RegisteredModule<H: DomWriter>: Sized {
    const KIND: ModuleKind;

    fn into_module(module: Arc<Self>) -> Module<H>;

    fn from_module(module: &Module<H>) -> Option<&Arc<Self>>;
}

impl<H: DomWriter> RegisteredModule<H> for ExampleModule<H> {
    const KIND: ModuleKind = ModuleKind::Example;

    fn into_module(module: Arc<Self>) -> Module<H> {
        Module::Example(module)
    }

    fn from_module(module: &Module<H>) -> Option<&Arc<Self>> {
        match module {
            Module::Example(m) => Some(m),
            _ => None,
        }
    }
}

impl<H: DomWriter> RegisteredModule<H> for MobileModule<H> {
    const KIND: ModuleKind = ModuleKind::Mobile;

    fn into_module(module: Arc<Self>) -> Module<H> {
        Module::Mobile(module)
    }

    fn from_module(module: &Module<H>) -> Option<&Arc<Self>> {
        match module {
            Module::Mobile(m) => Some(m),
            _ => None,
        }
    }
}

/// Registered modules in registration order, at most one per kind.
pub struct ModuleRegistry<H: DomWriter> {
    modules: Vec<Module<H>>,
}

impl<H: DomWriter> Default for ModuleRegistry<H> {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
        }
    }
}

impl<H: DomWriter> ModuleRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module`, replacing any module of the same kind.
    pub fn register<M: RegisteredModule<H>>(&mut self, module: Arc<M>) -> Option<Module<H>> {
        self.insert(M::into_module(module))
    }

    pub fn insert(&mut self, module: Module<H>) -> Option<Module<H>> {
        let kind = module.kind();
        match self.modules.iter_mut().find(|m| m.kind() == kind) {
            Some(slot) => Some(std::mem::replace(slot, module)),
            None => {
                self.modules.push(module);
                None
            }
        }
    }

    pub fn get<M: RegisteredModule<H>>(&self) -> Option<&Arc<M>> {
        self.get_kind(M::KIND).and_then(M::from_module)
    }

    pub fn get_kind(&self, kind: ModuleKind) -> Option<&Module<H>> {
        self.modules.iter().find(|m| m.kind() == kind)
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.get_kind(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<ModuleKind> {
        self.modules.iter().map(Module::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<H: DomWriter> fmt::Debug for ModuleRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::environment::PageEnvironment;
    use std::time::Duration;
    use userscript_detect::DeviceProfile;
    use userscript_dom::MemoryDom;
    use userscript_gesture::{GestureConfig, TokioScheduler};
    use userscript_storage::Storage;

    fn env() -> PageEnvironment<MemoryDom> {
        PageEnvironment::new(
            Arc::new(MemoryDom::new()),
            Storage::in_memory(),
            Capabilities::none(),
            DeviceProfile::detect("test-agent", false),
            Arc::new(TokioScheduler::current().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_typed_lookup() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.is_empty());

        let example = Arc::new(ExampleModule::new(env(), Duration::from_secs(1)));
        registry.register(Arc::clone(&example));

        assert!(Arc::ptr_eq(
            registry.get::<ExampleModule<_>>().unwrap(),
            &example
        ));
        assert!(registry.get::<MobileModule<_>>().is_none());
        assert!(registry.contains(ModuleKind::Example));
        assert!(!registry.contains(ModuleKind::Mobile));
    }

    #[tokio::test]
    async fn test_register_replaces_same_kind() {
        let mut registry = ModuleRegistry::new();
        let first = Arc::new(MobileModule::new(env(), GestureConfig::default()));
        let second = Arc::new(MobileModule::new(env(), GestureConfig::default()));
        let example = Arc::new(ExampleModule::new(env(), Duration::from_secs(1)));

        assert!(registry.register(first).is_none());
        registry.register(example);
        let previous = registry.register(Arc::clone(&second));

        assert_eq!(previous.map(|m| m.kind()), Some(ModuleKind::Mobile));
        assert_eq!(registry.kinds(), vec![ModuleKind::Mobile, ModuleKind::Example]);
        assert!(Arc::ptr_eq(registry.get::<MobileModule<_>>().unwrap(), &second));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ModuleKind::Example.to_string(), "example");
        assert_eq!(serde_json::to_string(&ModuleKind::Mobile).unwrap(), "\"mobile\"");
    }
}
