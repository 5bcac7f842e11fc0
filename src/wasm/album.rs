use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, HtmlLinkElement,
    Request, RequestInit, RequestMode, Response, Window,
};

use super::render::Visualizer;
use super::to_js;
use crate::now_playing::NowPlaying;
use crate::palette::{Palette, PixelBuffer};

async fn fetch_now_playing(window: &Window, url: &str) -> Result<NowPlaying, JsValue> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);
    let request = Request::new_with_str_and_init(url, &init)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(format!("{url} answered {}", response.status()).into());
    }
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .ok_or("now-playing body is not text")?;
    NowPlaying::from_json(&body).map_err(to_js)
}

/// Decodes `url` and reads its RGBA pixels back through an offscreen canvas.
async fn image_pixels(document: &Document, url: &str) -> Result<(u32, u32, Vec<u8>), JsValue> {
    let image = HtmlImageElement::new()?;
    // without CORS the canvas is tainted and getImageData throws
    image.set_cross_origin(Some("anonymous"));
    image.set_src(url);
    JsFuture::from(image.decode()).await?;

    let (width, height) = (image.natural_width(), image.natural_height());
    if width == 0 || height == 0 {
        return Err("album art has no pixels".into());
    }

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let context = canvas
        .get_context("2d")?
        .ok_or("2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()?;
    context.draw_image_with_html_image_element(&image, 0.0, 0.0)?;
    let data = context.get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?;
    Ok((width, height, data.data().0))
}

/// Fetches the current track, retitles the page, points the favicon at the
/// album art and recolours the shaders with its palette.
pub(crate) async fn apply_now_playing(
    visualizer: &Rc<RefCell<Visualizer>>,
    url: &str,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let track = fetch_now_playing(&window, url).await?;

    if let Some(title) = track.title() {
        document.set_title(title);
    }
    let Some(image_url) = track.image_url() else {
        log::info!("nothing playing, keeping the default palette");
        return Ok(());
    };

    let favicon_id = visualizer.borrow().config.favicon_id.clone();
    match document
        .get_element_by_id(&favicon_id)
        .and_then(|element| element.dyn_into::<HtmlLinkElement>().ok())
    {
        Some(link) => link.set_href(image_url),
        None => log::debug!("no favicon link '{favicon_id}'"),
    }

    let (width, height, rgba) = image_pixels(&document, image_url).await?;
    let pixels = PixelBuffer::new(width, height, &rgba).map_err(to_js)?;
    let mut visualizer = visualizer.borrow_mut();
    let palette = Palette::from_pixels(&pixels, visualizer.config.bucket_size);
    log::info!("palette from {width}x{height} album art: {:?}", palette.colors());
    visualizer.renderer.replace_palette(palette);
    Ok(())
}
