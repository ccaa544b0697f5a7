use glam::Vec2;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::camera::MIN_SCALE;
use crate::core::{
    Addressing, ColorMode, ElementStride, FrameStats, PaletteAlgorithm, PaletteMode, ThresholdConfig, UnalignedScan,
    Visualizer, MAX_THRESHOLD_RANGES, PALETTE_SIZE,
};
use crate::math::Rgb;

pub const MAX_WINDOW_WIDTH: u32 = 2560;
const MAX_SCALE: f32 = 100.0;
const SWATCH_SIZE: f32 = 10.0;
const SWATCHES_PER_ROW: usize = 16;

/// Tessellated UI waiting for the next paint
struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// egui context, its winit bridge and its wgpu renderer
pub struct Gui {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    prepared: Option<PreparedUi>,
}

impl Gui {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
            prepared: None,
        }
    }

    /// Returns true when egui consumed the event
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn wants_pointer_input(&self) -> bool {
        self.ctx.wants_pointer_input() || self.ctx.is_pointer_over_area()
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// Build this frame's UI; painting happens later in the render pass
    pub fn run(&mut self, window: &Window, build: impl FnMut(&egui::Context)) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, build);
        self.state.handle_platform_output(window, output.platform_output);

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.prepared = Some(PreparedUi {
            primitives,
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        });
    }

    /// Record the UI on top of whatever `view` already holds
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let Some(prepared) = self.prepared.take() else {
            return;
        };

        for (id, image_delta) in &prepared.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: prepared.pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &prepared.primitives, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &prepared.primitives, &screen_descriptor);
        }

        for id in &prepared.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Accept `1F00`, `0x1f00` or `0X1F00`
pub fn parse_hex_offset(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).ok()
}

/// Numbers for the status line
#[derive(Debug, Clone, Copy, Default)]
pub struct Status {
    pub fps: f32,
    pub last_frame: FrameStats,
}

/// Side panel that edits the visualizer through its mutators
#[derive(Debug, Clone)]
pub struct ControlPanel {
    offset_text: String,
    editing_offset: bool,
    /// Restored when switching back to thresholding
    threshold_config: ThresholdConfig,
}

impl ControlPanel {
    pub fn new(visualizer: &Visualizer) -> Self {
        let threshold_config = match visualizer.color_mode() {
            ColorMode::Thresholding(config) => config,
            _ => ThresholdConfig::new(),
        };
        Self {
            offset_text: format!("{:X}", visualizer.offset()),
            editing_offset: false,
            threshold_config,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, vis: &mut Visualizer, status: &Status) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_line(ui, vis, status));

        egui::SidePanel::left("controls").resizable(true).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::CollapsingHeader::new("Data")
                    .default_open(true)
                    .show(ui, |ui| self.data_section(ui, vis));
                egui::CollapsingHeader::new("Camera")
                    .default_open(true)
                    .show(ui, |ui| self.camera_section(ui, vis));
                egui::CollapsingHeader::new("Color")
                    .default_open(true)
                    .show(ui, |ui| self.color_section(ui, vis));
            });
        });
    }

    fn status_line(&self, ui: &mut egui::Ui, vis: &Visualizer, status: &Status) {
        let stats = &status.last_frame;
        ui.horizontal(|ui| {
            ui.label(format!("{:.0} FPS", status.fps));
            ui.separator();
            ui.label(format!("{} bytes", vis.buffer_len()));
            ui.separator();
            ui.label(format!("{} available at 0x{:X}", vis.available_bytes(), vis.offset()));
            ui.separator();
            ui.label(format!(
                "frame {}: {} pixel / {} quad recomputes, {} uploads",
                stats.number, stats.texture_recomputes, stats.quad_recomputes, stats.uploads
            ));
        });
    }

    fn data_section(&mut self, ui: &mut egui::Ui, vis: &mut Visualizer) {
        let limit = vis.size_limit();
        let size = vis.window_size();

        let mut width = size.x;
        let max_width = MAX_WINDOW_WIDTH.min(limit);
        if ui
            .add(
                egui::Slider::new(&mut width, 1..=max_width)
                    .clamping(egui::SliderClamping::Edits)
                    .text("Width"),
            )
            .changed()
        {
            vis.set_window_size(width, size.y);
        }

        ui.horizontal_wrapped(|ui| {
            for preset in (3..=11).map(|shift| 1u32 << shift) {
                if ui.selectable_label(size.x == preset, preset.to_string()).clicked() {
                    vis.set_window_size(preset, size.y);
                }
            }
        });

        let size = vis.window_size();
        let rows_in_buffer = (vis.buffer_len() / size.x as u64).clamp(1, limit as u64) as u32;
        let mut height = size.y;
        ui.horizontal(|ui| {
            ui.label("Height");
            if ui
                .add(
                    egui::DragValue::new(&mut height)
                        .range(1..=rows_in_buffer)
                        .clamp_existing_to_range(false),
                )
                .changed()
            {
                vis.set_window_size(size.x, height);
            }
        });

        if !self.editing_offset {
            self.offset_text = format!("{:X}", vis.offset());
        }
        ui.horizontal(|ui| {
            ui.label("Offset 0x");
            let response = ui.text_edit_singleline(&mut self.offset_text);
            if response.lost_focus() {
                match parse_hex_offset(&self.offset_text) {
                    Some(offset) => {
                        vis.set_offset(offset);
                    }
                    None => log::debug!("Ignoring offset '{}'", self.offset_text),
                }
            }
            self.editing_offset = response.has_focus();
        });

        ui.horizontal(|ui| {
            if ui.button("Page up").clicked() {
                vis.page(-1);
            }
            if ui.button("Page down").clicked() {
                vis.page(1);
            }
        });
    }

    fn camera_section(&mut self, ui: &mut egui::Ui, vis: &mut Visualizer) {
        let mut position = vis.position();
        ui.horizontal(|ui| {
            ui.label("Position");
            let x = ui.add(egui::DragValue::new(&mut position.x));
            let y = ui.add(egui::DragValue::new(&mut position.y));
            if x.changed() || y.changed() {
                vis.set_position(Vec2::new(position.x, position.y));
            }
            if ui.button("Reset").clicked() {
                vis.reset_position();
            }
        });

        let mut scale = vis.scale();
        ui.horizontal(|ui| {
            ui.label("Scale");
            if ui
                .add(
                    egui::DragValue::new(&mut scale)
                        .speed(0.01)
                        .range(MIN_SCALE..=MAX_SCALE)
                        .clamp_existing_to_range(false),
                )
                .changed()
            {
                vis.set_scale(scale);
            }
            if ui.button("Reset").clicked() {
                vis.reset_scale();
            }
        });
    }

    fn color_section(&mut self, ui: &mut egui::Ui, vis: &mut Visualizer) {
        let mode = vis.color_mode();
        ui.horizontal(|ui| {
            if ui.selectable_label(mode == ColorMode::Grayscale, "Grayscale").clicked() {
                vis.set_color_mode(ColorMode::Grayscale);
            }
            let thresholding = matches!(mode, ColorMode::Thresholding(_));
            if ui.selectable_label(thresholding, "Thresholding").clicked() && !thresholding {
                vis.set_color_mode(ColorMode::Thresholding(self.threshold_config));
            }
            if ui.selectable_label(mode.is_paletted(), "Paletted").clicked() {
                vis.set_color_mode(ColorMode::Paletted);
            }
        });
        ui.separator();

        match vis.color_mode() {
            ColorMode::Thresholding(config) => self.threshold_controls(ui, vis, config),
            ColorMode::Paletted => Self::palette_controls(ui, vis),
            ColorMode::Grayscale => {
                ui.label("One gray pixel per byte");
            }
        }
    }

    fn threshold_controls(&mut self, ui: &mut egui::Ui, vis: &mut Visualizer, config: ThresholdConfig) {
        let mut four_byte = config.stride == ElementStride::Float;
        if ui.checkbox(&mut four_byte, "One pixel per float").changed() {
            vis.set_four_byte_stride(four_byte);
        }

        let mut edited = config;
        let mut unaligned = config.addressing == Addressing::Unaligned;
        if ui.checkbox(&mut unaligned, "Unaligned floats").changed() {
            edited.addressing = if unaligned {
                Addressing::Unaligned
            } else {
                Addressing::Aligned
            };
        }
        if unaligned && config.stride == ElementStride::Byte {
            let mut skip = config.scan == UnalignedScan::SkipMatched;
            if ui.checkbox(&mut skip, "Skip bytes of matched floats").changed() {
                edited.scan = if skip {
                    UnalignedScan::SkipMatched
                } else {
                    UnalignedScan::EveryByte
                };
            }
        }
        ui.checkbox(&mut edited.grayscale_underlay, "Grayscale underlay");
        if edited != config {
            vis.set_color_mode(ColorMode::Thresholding(edited));
        }
        if let ColorMode::Thresholding(current) = vis.color_mode() {
            self.threshold_config = current;
        }

        ui.separator();
        ui.label("Ranges (first match wins)");

        let ranges = vis.threshold_ranges().to_vec();
        let mut remove = None;
        for (index, range) in ranges.iter().enumerate() {
            let mut edit = *range;
            let mut color = edit.color.to_array();
            ui.horizontal(|ui| {
                ui.checkbox(&mut edit.enabled, "");
                ui.add(egui::DragValue::new(&mut edit.start).speed(0.1));
                ui.label("..=");
                ui.add(egui::DragValue::new(&mut edit.end).speed(0.1));
                ui.color_edit_button_srgb(&mut color);
                if ui.small_button("x").clicked() {
                    remove = Some(index);
                }
            });
            edit.color = Rgb::from(color);
            if edit != *range {
                vis.set_threshold_range(index, edit.start, edit.end, edit.color, edit.enabled);
            }
        }
        if let Some(index) = remove {
            vis.remove_threshold_range(index);
        }

        if ranges.len() < MAX_THRESHOLD_RANGES && ui.button("Add range").clicked() {
            vis.set_threshold_range(ranges.len(), 1.0, 2.0, Rgb::gray(0xC0), true);
        }
    }

    fn palette_controls(ui: &mut egui::Ui, vis: &mut Visualizer) {
        ui.horizontal(|ui| {
            for algorithm in PaletteAlgorithm::ALL {
                if ui.button(algorithm.name()).clicked() {
                    vis.regenerate_palette(algorithm);
                }
            }
            if ui.button("Shuffle").clicked() {
                vis.shuffle_palette();
            }
        });

        let mut black_zero = vis.palette().mode() == PaletteMode::BlackZero;
        if ui.checkbox(&mut black_zero, "Byte 0 is black").changed() {
            vis.set_palette_mode(if black_zero {
                PaletteMode::BlackZero
            } else {
                PaletteMode::Generated
            });
        }

        let colors = *vis.palette().colors();
        let swatch = egui::vec2(SWATCH_SIZE, SWATCH_SIZE);
        for row in colors.chunks(SWATCHES_PER_ROW).take(PALETTE_SIZE / SWATCHES_PER_ROW) {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(1.0, 1.0);
                for color in row {
                    let (rect, _) = ui.allocate_exact_size(swatch, egui::Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 0.0, egui::Color32::from_rgb(color.r, color.g, color.b));
                }
            });
        }
    }
}
