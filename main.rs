//! main.rs - Desktop preview of the portfolio page behavior
//! Hero canvas in a simulator window, contact form driven from the keyboard

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::{Baseline, Text},
};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};

use portfolio_fx::{
    DeliveryError, Delivery, EgSurface, Elements, Field, Page, PageSettings, Rgb,
    SubmissionRequest, SubmitOutcome,
};

const SCREEN_WIDTH: u32 = 640;
const SCREEN_HEIGHT: u32 = 360;
const BACKGROUND: Rgb = Rgb::new(10, 10, 22);

// Viewport presets cycled with R
const VIEWPORTS: [(u32, u32); 3] = [(640, 360), (480, 270), (320, 180)];

/// Stand-in for the email relay: logs the message and succeeds unless told to fail.
struct LogRelay {
    fail: Cell<bool>,
}

impl Delivery for LogRelay {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        request: &SubmissionRequest,
    ) -> Result<(), DeliveryError> {
        log::info!(
            "relay {}/{}: from {} <{}>, {} chars",
            service_id,
            template_id,
            request.name,
            request.email,
            request.message.chars().count()
        );
        if self.fail.get() {
            Err(DeliveryError::Unreachable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

type Preview = Page<EgSurface<SimulatorDisplay<Rgb888>>, LogRelay>;

fn fill_demo_form(page: &mut Preview, valid: bool) {
    let Some(form) = page.contact.as_mut() else {
        return;
    };
    if valid {
        form.edit(Field::Name, "  Ada Lovelace ");
        form.edit(Field::Email, "ada@example.com");
        form.edit(Field::Message, "Loved the projects section, let's talk!");
    } else {
        form.edit(Field::Name, "A");
        form.edit(Field::Email, "ada-at-example");
        form.edit(Field::Message, "");
    }
}

fn draw_overlay(page: &mut Preview) {
    let text_color = Rgb888::new(200, 200, 230);
    let dim = Rgb888::new(90, 90, 130);
    let style = MonoTextStyle::new(&FONT_6X10, text_color);
    let hint_style = MonoTextStyle::new(&FONT_6X10, dim);

    let typed = page.typing.as_ref().map(|t| t.text()).unwrap_or("");
    let mut lines: Vec<(String, MonoTextStyle<'_, Rgb888>)> = vec![(format!("> {}_", typed), style)];

    if let Some(form) = page.contact.as_ref() {
        let button = form.button();
        lines.push((
            format!("[{}]{}", button.label, if button.enabled { "" } else { " (disabled)" }),
            style,
        ));
        for err in form.errors() {
            lines.push((format!("  {}: {}", err.field().id(), err), style));
        }
        if form.success_visible() {
            lines.push(("Message sent! I'll get back to you soon.".to_string(), style));
        }
        if let Some(notice) = form.notice() {
            lines.push((format!("! {} (D to dismiss)", notice), style));
        }
        if form.delivery().fail.get() {
            lines.push(("relay: failing".to_string(), hint_style));
        }
    }

    let ring = page.cursor.map(|c| (c.ring, c.dot(), c.dot_opacity()));

    let Some(canvas) = page.canvas_mut() else {
        return;
    };
    let display = canvas.target_mut();

    for (i, (line, style)) in lines.iter().enumerate() {
        let _ = Text::with_baseline(line, Point::new(5, 5 + 12 * i as i32), *style, Baseline::Top)
            .draw(display);
    }

    let _ = Text::with_baseline(
        "S: Send | E: Send invalid | F: Fail relay | R: Resize | Q: Quit",
        Point::new(5, SCREEN_HEIGHT as i32 - 12),
        hint_style,
        Baseline::Top,
    )
    .draw(display);

    if let Some((ring, dot, opacity)) = ring {
        let accent = Rgb::new(99, 102, 241);
        let ring_color = accent.over(BACKGROUND, 0.8);
        let _ = Circle::with_center(Point::new(ring.0 as i32, ring.1 as i32), 14)
            .into_styled(PrimitiveStyle::with_stroke(
                Rgb888::new(ring_color.r, ring_color.g, ring_color.b),
                1,
            ))
            .draw(display);
        let dot_color = Rgb::new(255, 255, 255).over(BACKGROUND, opacity);
        let _ = Circle::with_center(Point::new(dot.0 as i32, dot.1 as i32), 4)
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(dot_color.r, dot_color.g, dot_color.b)))
            .draw(display);
    }
}

fn submit(page: &mut Preview) {
    let Some(form) = page.contact.as_mut() else {
        return;
    };
    match pollster::block_on(form.submit()) {
        SubmitOutcome::Delivered => println!("Message sent"),
        SubmitOutcome::Rejected => println!("Fix the highlighted fields"),
        SubmitOutcome::Ignored => println!("Already sending"),
        SubmitOutcome::Failed(err) => println!("Message failed: {}", err),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let display: SimulatorDisplay<Rgb888> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Portfolio - Hero Preview", &output_settings);

    let relay = LogRelay { fail: Cell::new(false) };
    let mut page: Preview = Page::start(
        Elements::full(),
        Some(EgSurface::new(display, BACKGROUND)),
        relay,
        PageSettings::default(),
    );
    let mut viewport = 0;

    let mut last_update = Instant::now();
    let target_fps = 60;
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps as f32);

    println!("=== Portfolio - Hero Preview ===");
    println!("Controls:");
    println!("  S: Submit a valid message");
    println!("  E: Submit an invalid message");
    println!("  F: Toggle relay failure");
    println!("  D: Dismiss failure notice");
    println!("  R: Cycle viewport size");
    println!("  Q: Quit");

    'main_loop: loop {
        let now = Instant::now();
        let dt = now.duration_since(last_update).as_secs_f32();
        last_update = now;

        page.update(dt);

        // Whole window first; the field only clears its own buffer
        if let Some(canvas) = page.canvas_mut() {
            let _ = canvas
                .target_mut()
                .clear(Rgb888::new(BACKGROUND.r, BACKGROUND.g, BACKGROUND.b));
        }
        page.on_animation_frame();
        draw_overlay(&mut page);

        if let Some(canvas) = page.canvas() {
            window.update(canvas.target());
        }

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'main_loop,
                SimulatorEvent::MouseMove { point } => {
                    if let Some(cursor) = page.cursor.as_mut() {
                        cursor.on_mouse_move(point.x as f32, point.y as f32);
                        cursor.set_hovering(point.y < 40);
                    }
                }
                SimulatorEvent::KeyDown { keycode, .. } => {
                    let key = format!("{:?}", keycode).to_lowercase();
                    match key.as_str() {
                        "s" => {
                            fill_demo_form(&mut page, true);
                            submit(&mut page);
                        }
                        "e" => {
                            fill_demo_form(&mut page, false);
                            submit(&mut page);
                        }
                        "f" => {
                            if let Some(form) = page.contact.as_ref() {
                                let relay = &form.delivery().fail;
                                relay.set(!relay.get());
                                println!("Relay failing: {}", relay.get());
                            }
                        }
                        "d" => {
                            if let Some(form) = page.contact.as_mut() {
                                form.dismiss_notice();
                            }
                        }
                        "r" => {
                            viewport = (viewport + 1) % VIEWPORTS.len();
                            let (w, h) = VIEWPORTS[viewport];
                            if let Some(canvas) = page.canvas_mut() {
                                canvas.set_rendered_size(w, h);
                            }
                            page.on_resize();
                            println!("Viewport: {}x{}", w, h);
                        }
                        "q" => break 'main_loop,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Frame rate limiting
        let elapsed = now.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    println!("Bye!");
}
