use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, Request, RequestCredentials, RequestInit, Response, Window};

/// Read a string global such as `window.__BASE_URL` set by the host page.
pub fn page_global(window: &Window, name: &str) -> Option<String> {
    js_sys::Reflect::get(window, &JsValue::from_str(name))
        .ok()?
        .as_string()
}

pub fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = html_element(document, id) {
        el.set_inner_text(text);
    }
}

/// Body of the first URL that answers 2xx with text. Plain `fetch`, no
/// credentials, so the CDN copy stays usable.
pub async fn fetch_first_text(window: &Window, urls: &[&str]) -> Option<String> {
    for url in urls {
        match fetch_text(window, url).await {
            Ok(text) => return Some(text),
            Err(e) => log::debug!("skipping {url}: {e:?}"),
        }
    }
    None
}

async fn fetch_text(window: &Window, url: &str) -> Result<String, JsValue> {
    let resp: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    read_body(resp, url).await
}

async fn read_body(resp: Response, url: &str) -> Result<String, JsValue> {
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("{} {url}", resp.status())));
    }
    JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

/// Issue a credentialed request to the auth service and return the body of
/// a 2xx response.
pub async fn send_text(
    window: &Window,
    method: &str,
    url: &str,
    json_body: Option<&str>,
) -> Result<String, JsValue> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_credentials(RequestCredentials::Include);
    if let Some(body) = json_body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &init)?;
    if json_body.is_some() {
        request.headers().set("Content-Type", "application/json")?;
    }
    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    read_body(resp, url).await
}
