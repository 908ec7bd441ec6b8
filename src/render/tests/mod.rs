//! Rendering tests, driven through the tokenizer.

use super::Renderer;
use crate::config::Config;
use crate::tokenizer::Tokenizer;

mod block;
mod google;
mod inline;

fn render_with(html: &str, config: &Config) -> String {
    let mut renderer = Renderer::new(config);
    for event in Tokenizer::new(html) {
        renderer.handle(event);
    }
    renderer.finish()
}

fn render(html: &str) -> String {
    render_with(html, &Config::default())
}
