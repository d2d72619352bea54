use crate::capabilities::Capabilities;
use std::sync::Arc;
use userscript_detect::DeviceProfile;
use userscript_dom::{DomWriter, ElementWatcher};
use userscript_gesture::SchedulerRef;
use userscript_storage::Storage;

/// Everything a module needs from the page it runs on.
///
/// Built once at startup and shared by the app and every module.
pub struct PageEnvironment<H: DomWriter> {
    pub dom: Arc<H>,
    pub watcher: ElementWatcher<H>,
    pub storage: Storage,
    pub capabilities: Capabilities,
    pub device: Arc<DeviceProfile>,
    pub scheduler: SchedulerRef,
}

impl<H: DomWriter> PageEnvironment<H> {
    pub fn new(
        dom: Arc<H>,
        storage: Storage,
        capabilities: Capabilities,
        device: DeviceProfile,
        scheduler: SchedulerRef,
    ) -> Self {
        Self {
            watcher: ElementWatcher::new(Arc::clone(&dom)),
            dom,
            storage,
            capabilities,
            device: Arc::new(device),
            scheduler,
        }
    }
}

impl<H: DomWriter> Clone for PageEnvironment<H> {
    fn clone(&self) -> Self {
        Self {
            dom: Arc::clone(&self.dom),
            watcher: self.watcher.clone(),
            storage: self.storage.clone(),
            capabilities: self.capabilities.clone(),
            device: Arc::clone(&self.device),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<H: DomWriter> std::fmt::Debug for PageEnvironment<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageEnvironment")
            .field("capabilities", &self.capabilities)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}
