//! Browser frontend: binds a [`Navigator`] to `window` events via wasm-bindgen.
//!
//! Everything runs on the UI thread. The navigator is shared between the
//! listener closures through `Rc<RefCell<_>>`; every handler borrows it for
//! the duration of one synchronous decision and releases it before calling
//! back into JS.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Event, Performance, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, TouchEvent, WheelEvent, Window,
};

use crate::controller::Tuning;
use crate::input::WheelDeltaMode;
use crate::navigator::{Navigator, ScrollHost};
use crate::section::{Rect, SectionList};

type Shared = Rc<RefCell<Navigator<DomHost>>>;

// ---------------------------------------------------------------------------
// DomHost — scroll commands and active-section notifications
// ---------------------------------------------------------------------------

struct DomHost {
    document: Document,
    /// Change waiting to be delivered once the navigator borrow is released.
    pending_active: Option<(usize, String)>,
}

impl ScrollHost for DomHost {
    fn scroll_into_view(&mut self, _order: usize, id: &str) {
        let Some(el) = self.document.get_element_by_id(id) else {
            warn!("web: no element with id '{id}' to scroll to");
            return;
        };
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(ScrollBehavior::Smooth);
        opts.set_block(ScrollLogicalPosition::Start);
        el.scroll_into_view_with_scroll_into_view_options(&opts);
    }

    fn active_changed(&mut self, order: usize, id: &str) {
        self.pending_active = Some((order, id.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Listener — Drop detaches from the window
// ---------------------------------------------------------------------------

struct Listener {
    window: Window,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        window: &Window,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let opts = AddEventListenerOptions::new();
        opts.set_passive(passive);
        window.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &opts,
        )?;
        Ok(Self {
            window: window.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

// ---------------------------------------------------------------------------
// WebNavigator — JS-facing API
// ---------------------------------------------------------------------------

/// Section pager for the page shell.
///
/// Construct once the section elements are mounted; call `destroy()` when
/// the shell unmounts. Dropping the object also detaches every listener.
#[wasm_bindgen]
pub struct WebNavigator {
    shared: Shared,
    on_active_change: Rc<Option<js_sys::Function>>,
    window: Window,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl WebNavigator {
    /// `section_ids` are the DOM ids of the section root elements in page
    /// order. `on_active_change(id, order)` is called whenever the active
    /// section changes.
    #[wasm_bindgen(constructor)]
    pub fn new(
        section_ids: js_sys::Array,
        on_active_change: Option<js_sys::Function>,
    ) -> Result<WebNavigator, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let ids: Vec<String> = section_ids.iter().filter_map(|v| v.as_string()).collect();
        let sections = SectionList::new(ids).map_err(|e| JsValue::from_str(&format!("{e:#}")))?;

        let host = DomHost {
            document,
            pending_active: None,
        };
        let nav = Navigator::new(sections, Tuning::default(), viewport_height(&window), host);
        let mut this = WebNavigator {
            shared: Rc::new(RefCell::new(nav)),
            on_active_change: Rc::new(on_active_change),
            window,
            listeners: Vec::new(),
        };
        this.attach()?;
        this.refresh();
        Ok(this)
    }

    /// Id of the currently active section.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> String {
        self.shared
            .try_borrow()
            .map(|nav| nav.active_id().to_string())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self, id: &str) -> bool {
        self.shared
            .try_borrow()
            .is_ok_and(|nav| nav.is_active(id))
    }

    /// Smooth-scroll to a section by id (navigation dock).
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&self, id: &str) -> bool {
        let Ok(mut nav) = self.shared.try_borrow_mut() else {
            return false;
        };
        nav.jump_to(id)
    }

    /// Re-read every section's rectangle, e.g. after a section mounts or
    /// unmounts.
    pub fn refresh(&self) {
        if let Ok(mut nav) = self.shared.try_borrow_mut() {
            nav.set_viewport_height(viewport_height(&self.window));
            sync_rects(&mut nav);
        }
        flush_active(&self.shared, &self.on_active_change);
    }

    /// Detach all listeners.
    pub fn destroy(&mut self) {
        debug!("web: detaching {} listeners", self.listeners.len());
        self.listeners.clear();
    }
}

impl WebNavigator {
    fn attach(&mut self) -> Result<(), JsValue> {
        let perf = self.window.performance();

        let (shared, cb, perf_w) = self.handles(&perf);
        self.listeners.push(Listener::attach(&self.window, "wheel", false, move |event| {
            let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            let now = now(perf_w.as_ref());
            let mode = WheelDeltaMode::from_dom(wheel.delta_mode());
            let decision = shared
                .try_borrow_mut()
                .map(|mut nav| nav.wheel(wheel.delta_y(), mode, now));
            if decision.is_ok_and(|d| d.prevents_default()) {
                event.prevent_default();
            }
            flush_active(&shared, &cb);
        })?);

        let (shared, _, _) = self.handles(&perf);
        self.listeners.push(Listener::attach(&self.window, "touchstart", true, move |event| {
            if let Some(y) = first_touch_y(&event)
                && let Ok(mut nav) = shared.try_borrow_mut()
            {
                nav.touch_start(y);
            }
        })?);

        let (shared, cb, perf_t) = self.handles(&perf);
        self.listeners.push(Listener::attach(&self.window, "touchmove", false, move |event| {
            let Some(y) = first_touch_y(&event) else {
                return;
            };
            let now = now(perf_t.as_ref());
            let decision = shared.try_borrow_mut().map(|mut nav| nav.touch_move(y, now));
            if decision.is_ok_and(|step| step.is_some_and(|(_, d)| d.prevents_default())) {
                event.prevent_default();
            }
            flush_active(&shared, &cb);
        })?);

        for kind in ["touchend", "touchcancel"] {
            let (shared, _, _) = self.handles(&perf);
            self.listeners.push(Listener::attach(&self.window, kind, true, move |_| {
                if let Ok(mut nav) = shared.try_borrow_mut() {
                    nav.touch_end();
                }
            })?);
        }

        let (shared, cb, _) = self.handles(&perf);
        self.listeners.push(Listener::attach(&self.window, "scroll", true, move |_| {
            if let Ok(mut nav) = shared.try_borrow_mut() {
                sync_rects(&mut nav);
            }
            flush_active(&shared, &cb);
        })?);

        let (shared, cb, _) = self.handles(&perf);
        let window = self.window.clone();
        self.listeners.push(Listener::attach(&self.window, "resize", true, move |_| {
            if let Ok(mut nav) = shared.try_borrow_mut() {
                nav.set_viewport_height(viewport_height(&window));
                sync_rects(&mut nav);
            }
            flush_active(&shared, &cb);
        })?);

        Ok(())
    }

    fn handles(
        &self,
        perf: &Option<Performance>,
    ) -> (Shared, Rc<Option<js_sys::Function>>, Option<Performance>) {
        (
            Rc::clone(&self.shared),
            Rc::clone(&self.on_active_change),
            perf.clone(),
        )
    }
}

fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn now(perf: Option<&Performance>) -> Duration {
    let ms = perf.map_or_else(js_sys::Date::now, Performance::now);
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn first_touch_y(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(f64::from(touch.client_y()))
}

/// Register the current bounding rectangle of every section element.
fn sync_rects(nav: &mut Navigator<DomHost>) {
    let sections = nav.sections().clone();
    for id in sections.iter() {
        let rect = nav.host().document.get_element_by_id(id).map(|el| {
            let r = el.get_bounding_client_rect();
            Rect::new(r.top(), r.bottom())
        });
        nav.register(id, rect);
    }
    nav.refresh();
}

/// Deliver a pending active-section change to JS, outside any borrow.
fn flush_active(shared: &Shared, callback: &Option<js_sys::Function>) {
    let pending = match shared.try_borrow_mut() {
        Ok(mut nav) => nav.host_mut().pending_active.take(),
        Err(_) => return,
    };
    if let (Some((order, id)), Some(cb)) = (pending, callback) {
        let result = cb.call2(
            &JsValue::NULL,
            &JsValue::from_str(&id),
            &JsValue::from_f64(order as f64),
        );
        if let Err(e) = result {
            warn!("web: active-section callback threw: {e:?}");
        }
    }
}
