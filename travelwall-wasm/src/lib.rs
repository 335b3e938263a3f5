use std::cell::RefCell;
use std::rc::Rc;

use travelwall_core::upload_panel::{self, UploadPanelView};
use travelwall_core::{
    AppConfig, Atlas, HeaderView, SessionProvider, SessionState, WallController, map_view,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlImageElement, HtmlInputElement, Window};

mod auth;
mod map;
mod state;
mod upload;
mod utils;

use auth::AuthClient;
use state::State;
use upload::ObjectUrlStore;
use utils::{fetch_first_text, html_element, page_global, set_text};

/// Redraw the map and both panels from the current wall state.
fn render(state: &State) {
    let snap = state.wall.snapshot();
    let scene = map_view::compose_snapshot(&state.atlas, &snap);
    state.map_host.set_inner_html(&scene.to_svg());
    set_text(&state.document, "visited", &map_view::visited_label(&snap));
    set_text(&state.document, "selection", &map_view::selection_label(&snap));
    render_upload_panel(&state.document, &upload_panel::compose(&snap));
}

fn render_upload_panel(document: &Document, view: &UploadPanelView<'_>) {
    if let Some(el) = document.get_element_by_id("photoInput")
        && let Ok(input) = el.dyn_into::<HtmlInputElement>()
    {
        input.set_disabled(!view.picker_enabled);
    }
    set_text(document, "uploadHint", &view.hint);
    if let Some(panel) = html_element(document, "preview") {
        panel.set_hidden(view.preview.is_none());
    }
    if let Some(el) = document.get_element_by_id("previewImg")
        && let Ok(img) = el.dyn_into::<HtmlImageElement>()
    {
        match &view.preview {
            Some(p) => {
                img.set_src(p.url);
                img.set_alt(&p.alt);
            }
            // Drop the reference to a revoked URL.
            None => {
                let _ = img.remove_attribute("src");
            }
        }
    }
    if let Some(p) = &view.preview {
        set_text(document, "previewName", p.file_name);
    }
    if let Some(btn) = html_element(document, "clearPhoto") {
        btn.set_hidden(!view.show_clear());
    }
}

fn render_header(document: &Document, view: &HeaderView) {
    set_text(document, "userName", &view.user_label);
    if let Some(el) = html_element(document, "userName") {
        el.set_hidden(view.user_label.is_empty());
    }
    set_text(document, "authButton", view.button_label);
}

fn attach_session(document: &Document, auth: &AuthClient) -> Result<(), JsValue> {
    if let Some(btn) = html_element(document, "authButton") {
        let client = auth.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            HeaderView::compose(&client.current()).action.run(&client);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    let doc = document.clone();
    auth.subscribe(Rc::new(move |s: &SessionState| render_header(&doc, &HeaderView::compose(s))));
    render_header(document, &HeaderView::compose(&auth.current()));
    auth.refresh();
    Ok(())
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    upload::attach_file_input(state.clone())?;
    map::attach_map_events(state)?;
    Ok(())
}

async fn load_atlas(window: &Window, config: &AppConfig) -> Result<Atlas, JsValue> {
    let urls: Vec<&str> = config.atlas_urls.iter().map(String::as_str).collect();
    let text = fetch_first_text(window, &urls)
        .await
        .ok_or_else(|| JsValue::from_str("country dataset unavailable"))?;
    Atlas::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn install(document: Document, atlas: Atlas, map_host: HtmlElement) -> Result<(), JsValue> {
    let total = atlas.len();
    let state = Rc::new(RefCell::new(State {
        document,
        atlas,
        wall: WallController::new(ObjectUrlStore, total),
        map_host,
    }));
    attach_ui(state.clone())?;
    render(&state.borrow());
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    let config = AppConfig::from_page(
        &search,
        page_global(&window, "__BASE_URL"),
        page_global(&window, "__AUTH_BASE_URL"),
    );
    let map_host = html_element(&document, "map")
        .ok_or_else(|| JsValue::from_str("map host #map not found"))?;

    let auth = AuthClient::new(window.clone(), config.clone());
    attach_session(&document, &auth)?;

    map_host.set_inner_text("Loading map…");
    wasm_bindgen_futures::spawn_local(async move {
        match load_atlas(&window, &config).await {
            Ok(atlas) => {
                if let Err(e) = install(document, atlas, map_host) {
                    log::error!("failed to start the wall: {:?}", e);
                }
            }
            Err(e) => {
                log::error!("failed to load countries: {:?}", e);
                map_host.set_inner_text("The world map could not be loaded.");
            }
        }
    });
    Ok(())
}
