use std::cell::RefCell;
use std::rc::Rc;

use travelwall_core::Country;
use travelwall_core::map_view::is_activation_key;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, SvgElement};

use crate::{State, render};

/// Nearest region or marker under the event target.
fn activated_element(e: &Event) -> Option<Element> {
    let target: Element = e.target()?.dyn_into().ok()?;
    target.closest("[data-country-id]").ok().flatten()
}

fn country_of(el: &Element) -> Option<Country> {
    let id = el.get_attribute("data-country-id")?;
    let name = el.get_attribute("data-country-name").unwrap_or_default();
    Some(Country { id, name })
}

fn select_and_render(state: &Rc<RefCell<State>>, country: Country) {
    let mut s = state.borrow_mut();
    s.wall.select_country(country);
    render(&s);
}

/// Re-rendering replaces the SVG, so give focus back to the element that
/// was activated from the keyboard.
fn restore_focus(state: &Rc<RefCell<State>>, tag: &str, id: &str) {
    let s = state.borrow();
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    let selector = format!("{tag}[data-country-id=\"{escaped}\"]");
    if let Ok(Some(el)) = s.map_host.query_selector(&selector)
        && let Ok(el) = el.dyn_into::<SvgElement>()
    {
        let _ = el.focus();
    }
}

// Delegated pointer and keyboard selection on the map host.
pub fn attach_map_events(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let host = state.borrow().map_host.clone();
    {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            if let Some(country) = activated_element(&e).as_ref().and_then(country_of) {
                select_and_render(&st, country);
            }
        }));
        host.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }
    {
        let st = state.clone();
        let keydown =
            Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(move |e: KeyboardEvent| {
                if !is_activation_key(&e.key()) {
                    return;
                }
                let Some(el) = activated_element(&e) else {
                    return;
                };
                let Some(country) = country_of(&el) else {
                    return;
                };
                e.prevent_default();
                let tag = el.tag_name();
                let id = country.id.clone();
                select_and_render(&st, country);
                restore_focus(&st, &tag, &id);
            }));
        host.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }
    Ok(())
}
