use std::cell::RefCell;
use std::rc::Rc;

use travelwall_core::{PickedFile, ResourceHandle, ResourceStore};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, File, HtmlElement, HtmlInputElement, Url};

use crate::{State, render};

/// Object URLs over picked files.
#[derive(Debug, Default)]
pub struct ObjectUrlStore;

impl ResourceStore for ObjectUrlStore {
    type Source = PickedFile<File>;

    fn create(&mut self, picked: &PickedFile<File>) -> Option<ResourceHandle> {
        match Url::create_object_url_with_blob(&picked.file) {
            Ok(url) => Some(ResourceHandle::new(url)),
            Err(e) => {
                log::warn!("createObjectURL failed for {}: {:?}", picked.name, e);
                None
            }
        }
    }

    fn revoke(&mut self, handle: ResourceHandle) {
        if let Err(e) = Url::revoke_object_url(handle.as_str()) {
            log::warn!("revokeObjectURL failed for {handle}: {:?}", e);
        }
    }
}

// Wires up the photo picker and the clear button.
pub fn attach_file_input(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc: Document = state.borrow().document.clone();
    if let Some(input) = doc.get_element_by_id("photoInput") {
        let input: HtmlInputElement = input.dyn_into()?;
        let st = state.clone();
        let input_for_closure = input.clone();
        let onchange = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
            let file = input_for_closure
                .files()
                .and_then(|list| list.item(0))
                .map(|f| PickedFile::new(f.name(), f));
            if file.is_none() {
                log::debug!("photo dialog closed without a file");
            }
            {
                let mut s = st.borrow_mut();
                s.wall.attach_to_selection(file.as_ref());
                render(&s);
            }
            // Clear so that picking the same file again still fires `change`.
            input_for_closure.set_value("");
        }));
        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
    }

    if let Some(btn) = doc.get_element_by_id("clearPhoto") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            if let Some(id) = s.wall.selection().map(|c| c.id.clone()) {
                s.wall.clear_photo(&id);
            }
            render(&s);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}
