use travelwall_core::{Atlas, WallController};
use web_sys::{Document, HtmlElement};

use crate::upload::ObjectUrlStore;

/// Page state shared across the WASM callbacks behind an `Rc<RefCell<_>>`.
/// Created once the country dataset has loaded.
pub struct State {
    pub document: Document,
    pub atlas: Atlas,
    pub wall: WallController<ObjectUrlStore>,
    pub map_host: HtmlElement,
}
