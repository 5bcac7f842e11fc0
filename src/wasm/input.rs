use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use super::render::Visualizer;
use crate::gl::Surface;
use crate::uniforms::{pointer_position, CanvasRect};

fn point_at(visualizer: &Rc<RefCell<Visualizer>>, client_x: i32, client_y: i32) {
    let mut visualizer = visualizer.borrow_mut();
    let backend = visualizer.renderer.backend();
    let bounds = backend.canvas().get_bounding_client_rect();
    let rect = CanvasRect {
        left: bounds.left(),
        top: bounds.top(),
        width: bounds.width(),
        height: bounds.height(),
    };
    let [x, y] = pointer_position(
        f64::from(client_x),
        f64::from(client_y),
        rect,
        backend.backing_size(),
    );
    visualizer.renderer.set_pointer(x, y);
}

fn on_click(
    target: &EventTarget,
    visualizer: &Rc<RefCell<Visualizer>>,
    step: fn(&mut Visualizer) -> usize,
) -> Result<(), JsValue> {
    let visualizer = visualizer.clone();
    let closure = Closure::wrap(Box::new(move || {
        step(&mut visualizer.borrow_mut());
    }) as Box<dyn FnMut()>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Registers pointer, touch, keyboard and button handlers for the page.
///
/// Missing buttons are logged and skipped.
pub(crate) fn attach(
    window: &Window,
    document: &Document,
    visualizer: &Rc<RefCell<Visualizer>>,
) -> Result<(), JsValue> {
    let canvas: EventTarget = visualizer.borrow().renderer.backend().canvas().clone().into();

    let mouse = {
        let visualizer = visualizer.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            point_at(&visualizer, event.client_x(), event.client_y());
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("mousemove", mouse.as_ref().unchecked_ref())?;
    mouse.forget();

    // Touch listeners must be non-passive to suppress page scrolling.
    let touch = {
        let visualizer = visualizer.clone();
        Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
            if let Some(touch) = event.touches().get(0) {
                point_at(&visualizer, touch.client_x(), touch.client_y());
            }
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    for name in ["touchstart", "touchmove"] {
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            touch.as_ref().unchecked_ref(),
            &options,
        )?;
    }
    touch.forget();

    let keys = {
        let visualizer = visualizer.clone();
        Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let step: fn(&mut Visualizer) -> usize = match event.key().as_str() {
                "ArrowRight" => Visualizer::next,
                "ArrowLeft" => Visualizer::previous,
                _ => return,
            };
            step(&mut visualizer.borrow_mut());
        }) as Box<dyn FnMut(KeyboardEvent)>)
    };
    window.add_event_listener_with_callback("keydown", keys.as_ref().unchecked_ref())?;
    keys.forget();

    let config = visualizer.borrow().config.clone();
    let buttons: [(&str, fn(&mut Visualizer) -> usize); 2] = [
        (config.prev_button_id.as_str(), Visualizer::previous),
        (config.next_button_id.as_str(), Visualizer::next),
    ];
    for (id, step) in buttons {
        match document.get_element_by_id(id) {
            Some(button) => on_click(&button, visualizer, step)?,
            None => log::warn!("button '{id}' not found"),
        }
    }

    Ok(())
}
