use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    error::EventLoopError,
    event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::{
    catalogue::GalleryItem,
    config::Configuration,
    events::{ImageLoaded, LoadImage},
    gallery::{ControllerOptions, camera::Screen},
    gpu::GpuContext,
    host::GalleryHost,
    navigation::Navigator,
    renderer::{
        GalleryRenderer, RenderStyle,
        pipelines::{GalleryProgramCache, GalleryPrograms},
        text::TextRasterizer,
    },
};

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

type ImageReceiver = mpsc::Receiver<ImageLoaded>;
type LoadSender = mpsc::Sender<LoadImage>;

struct ViewerApp<N: Navigator> {
    cfg: Configuration,
    style: RenderStyle,
    cancel: CancellationToken,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    programs: GalleryProgramCache,
    rasterizer: TextRasterizer,
    host: GalleryHost<N>,
    pending_items: Option<Vec<GalleryItem>>,
    renderer: Option<GalleryRenderer>,
    rendered_generation: u64,
    from_loader: ImageReceiver,
    to_loader: LoadSender,
    cursor: Vec2,
    active_touch: Option<u64>,
    /// Window or GPU setup failure; returned from [`run_windowed`].
    init_error: Option<anyhow::Error>,
}

impl<N: Navigator> ViewerApp<N> {
    fn new(
        cfg: Configuration,
        style: RenderStyle,
        items: Vec<GalleryItem>,
        navigator: N,
        cancel: CancellationToken,
        from_loader: ImageReceiver,
        to_loader: LoadSender,
    ) -> Self {
        let screen = Screen::new(cfg.window.width as f32, cfg.window.height as f32);
        let host = GalleryHost::new(
            navigator,
            cfg.item_kind,
            ControllerOptions::from(&cfg),
            screen,
        );
        Self {
            cfg,
            style,
            cancel,
            window: None,
            gpu: None,
            programs: GalleryProgramCache::default(),
            rasterizer: TextRasterizer::with_system_fonts(),
            host,
            pending_items: Some(items),
            renderer: None,
            rendered_generation: 0,
            from_loader,
            to_loader,
            cursor: Vec2::ZERO,
            active_touch: None,
            init_error: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let attrs = WindowAttributes::default()
            .with_title(self.cfg.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.cfg.window.width, self.cfg.window.height));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create gallery window");
                self.init_error = Some(anyhow::Error::new(err).context("failed to create gallery window"));
                None
            }
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let size = window.inner_size();
        let gpu = GpuContext::new(window).context("failed to initialise drawing surface")?;
        self.gpu = Some(gpu);
        self.host
            .resize(Screen::new(size.width as f32, size.height as f32));
        if let Some(items) = self.pending_items.take() {
            self.host.set_items(items);
        }
        self.sync_renderer();
        Ok(())
    }

    /// Recreates GPU resources after the host rebuilt its gallery.
    fn sync_renderer(&mut self) {
        if self.host.generation() == self.rendered_generation {
            return;
        }
        self.rendered_generation = self.host.generation();
        self.renderer = None;

        let (Some(gpu), Some(controller)) = (self.gpu.as_ref(), self.host.controller()) else {
            return;
        };
        let programs = self
            .programs
            .get_or_build((gpu.id, gpu.format()), || {
                GalleryPrograms::build(&gpu.device, gpu.format())
            });
        let renderer = GalleryRenderer::new(
            &gpu.device,
            &gpu.queue,
            programs,
            controller,
            self.style.clone(),
            &mut self.rasterizer,
        );
        self.renderer = Some(renderer);

        for (item, entry) in controller.items().iter().enumerate() {
            let request = LoadImage {
                item,
                url: entry.image_url.clone(),
            };
            if let Err(err) = self.to_loader.try_send(request) {
                warn!(item, error = %err, "image_request_dropped");
            }
        }
    }

    fn drain_loader(&mut self) {
        while let Ok(loaded) = self.from_loader.try_recv() {
            let (Some(gpu), Some(renderer)) = (self.gpu.as_ref(), self.renderer.as_mut()) else {
                continue;
            };
            let item_count = self.host.controller().map_or(0, |c| c.items().len());
            for item in loaded.items.iter().copied().filter(|i| *i < item_count) {
                renderer.set_image(&gpu.device, &gpu.queue, item, &loaded.image);
            }
            debug!(url = %loaded.url, items = ?loaded.items, "image_uploaded");
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if !gpu.resize(new_size) {
            debug!("ignoring zero-area resize");
            return;
        }
        self.host
            .resize(Screen::new(new_size.width as f32, new_size.height as f32));
        debug!(
            width = new_size.width,
            height = new_size.height,
            "gallery surface resized"
        );
        self.request_redraw();
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        self.drain_loader();
        self.host.tick(Instant::now());

        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("gallery surface lost; reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("gallery surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("gallery surface acquisition timed out");
                return;
            }
            Err(err) => {
                warn!(error = %err, "gallery surface reported an error; retrying");
                gpu.reconfigure();
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gallery-encoder"),
            });

        let active = self.renderer.as_ref().zip(self.host.controller());
        if let Some((renderer, controller)) = active {
            renderer.prepare(&gpu.queue, controller);
        }
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.style.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some((renderer, controller)) = active {
                renderer.draw(controller, &mut rpass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let now = Instant::now();
        // Positive winit deltas move content right/down; the gallery advances the other way.
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                let dominant = if x.abs() > y.abs() { x } else { y };
                self.host.wheel_lines(-dominant, now);
            }
            MouseScrollDelta::PixelDelta(PhysicalPosition { x, y }) => {
                let dominant = if x.abs() > y.abs() { x } else { y };
                self.host.wheel_pixels(-dominant as f32, now);
            }
        }
    }

    fn handle_touch(&mut self, id: u64, phase: TouchPhase, at: Vec2) {
        match phase {
            TouchPhase::Started if self.active_touch.is_none() => {
                self.active_touch = Some(id);
                self.host.pointer_down(at, Instant::now());
            }
            TouchPhase::Moved if self.active_touch == Some(id) => {
                self.host.pointer_move(at);
            }
            TouchPhase::Ended if self.active_touch == Some(id) => {
                self.active_touch = None;
                self.host.pointer_up(at, Instant::now());
            }
            TouchPhase::Cancelled if self.active_touch == Some(id) => {
                self.active_touch = None;
                self.host.pointer_leave();
            }
            _ => {}
        }
    }
}

impl<N: Navigator> ApplicationHandler<ViewerEvent> for ViewerApp<N> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.gpu.is_none() {
            if let Err(err) = self.init_gpu(window) {
                error!(error = ?err, "failed to initialize GPU state");
                self.init_error = Some(err);
                event_loop.exit();
                return;
            }
        }

        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("gallery window close requested");
                self.host.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.host.pointer_move(self.cursor);
            }
            WindowEvent::CursorLeft { .. } => {
                self.host.pointer_leave();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.host.pointer_down(self.cursor, Instant::now()),
                ElementState::Released => {
                    self.host.pointer_up(self.cursor, Instant::now());
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_wheel(delta);
            }
            WindowEvent::Touch(touch) => {
                let at = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.handle_touch(touch.id, touch.phase, at);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        info!("escape pressed; closing gallery");
                        self.host.teardown();
                        event_loop.exit();
                    }
                    Key::Named(NamedKey::ArrowRight) => self.host.step_items(1),
                    Key::Named(NamedKey::ArrowLeft) => self.host.step_items(-1),
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.host.is_active() {
            self.request_redraw();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("gallery received cancellation event");
                self.host.teardown();
                event_loop.exit();
            }
        }
    }
}

/// Runs the gallery window on the current thread until it closes or `cancel` fires.
pub fn run_windowed<N: Navigator>(
    cfg: Configuration,
    items: Vec<GalleryItem>,
    navigator: N,
    from_loader: ImageReceiver,
    to_loader: LoadSender,
    cancel: CancellationToken,
) -> Result<()> {
    let style = RenderStyle::from_settings(&cfg.gallery)?;
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build gallery event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, style, items, navigator, cancel, from_loader, to_loader);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    finish_run(run_result, app.init_error.take())
}

// A setup failure takes precedence: the loop exits cleanly after it.
fn finish_run(run_result: Result<(), EventLoopError>, init_error: Option<anyhow::Error>) -> Result<()> {
    if let Some(err) = init_error {
        return Err(err);
    }
    run_result.context("gallery event loop failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;

    #[test]
    fn setup_failure_is_returned_after_a_clean_exit() {
        let err = anyhow::Error::new(GalleryError::TextRaster("no faces".into()))
            .context("failed to initialise drawing surface");
        let result = finish_run(Ok(()), Some(err));
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "failed to initialise drawing surface");
        assert!(err.downcast_ref::<GalleryError>().is_some());
    }

    #[test]
    fn clean_run_is_ok() {
        assert!(finish_run(Ok(()), None).is_ok());
    }

    #[test]
    fn event_loop_failure_is_reported() {
        let err = finish_run(Err(EventLoopError::ExitFailure(1)), None).unwrap_err();
        assert_eq!(err.to_string(), "gallery event loop failed");
    }
}
