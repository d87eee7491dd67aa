use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html::{
    ConverterConfig, HtmlParser, HtmlToHtmlConverter, HtmlTokenId, ParseStep, SanitizePolicy,
    sanitize,
};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

const BLOCK: &str = "<div class=box id=b style=\"color:red;position:absolute\">\
    <span onclick=\"x()\">hello &amp; bye</span><a href=\"https://example.com/p?q=1\">l</a>\
    <img src=x alt=\"a\"><script>alert(1)</script></div>\n";

fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(blocks * BLOCK.len() + 64);
    out.push_str("<html><head><style>.box{color:red} #b:hover{margin:-1px}</style></head><body>");
    for _ in 0..blocks {
        out.push_str(BLOCK);
    }
    out.push_str("</body></html>");
    out
}

fn make_style_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<style>");
    while body.len() < bytes {
        body.push_str("a,b.c>d{x:url(javascript:y);color:red}@media q{");
    }
    body.push_str("</style>");
    body
}

fn policy(config: ConverterConfig) -> Arc<SanitizePolicy> {
    Arc::new(config.build().expect("valid bench config"))
}

fn tokenize_all(input: &str) -> usize {
    let mut parser = HtmlParser::new();
    parser.push_str(input);
    parser.finish();
    let mut tokens = 0usize;
    loop {
        match parser.parse().expect("bench input parses") {
            ParseStep::Token(HtmlTokenId::EndOfFile) | ParseStep::NeedMoreInput => break,
            ParseStep::Token(_) => tokens += 1,
        }
    }
    tokens
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| black_box(tokenize_all(black_box(&input))));
    });
}

fn bench_sanitize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    let policy = policy(ConverterConfig::default());
    c.bench_function("bench_sanitize_small", |b| {
        b.iter(|| {
            let out = sanitize(black_box(&input), &policy).expect("sanitize");
            black_box(out.len());
        });
    });
}

fn bench_sanitize_large_fragment(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    let policy = policy(ConverterConfig::fragment());
    c.bench_function("bench_sanitize_large_fragment", |b| {
        b.iter(|| {
            let out = sanitize(black_box(&input), &policy).expect("sanitize");
            black_box(out.len());
        });
    });
}

fn bench_sanitize_chunked(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    let policy = policy(ConverterConfig::default());
    let chunk_sizes = [1usize, 2, 3, 7, 64, 128, 256, 1024];
    c.bench_function("bench_sanitize_chunked", |b| {
        b.iter_batched(
            || HtmlToHtmlConverter::new(Arc::clone(&policy)),
            |mut converter| {
                let mut written = 0usize;
                let mut offset = 0usize;
                let mut size_idx = 0usize;
                while offset < input.len() {
                    let size = chunk_sizes[size_idx % chunk_sizes.len()];
                    let mut end = (offset + size).min(input.len());
                    while !input.is_char_boundary(end) {
                        end += 1;
                    }
                    converter
                        .push_str(&input[offset..end])
                        .expect("push_str should accept bench input");
                    written += converter.take_output().len();
                    offset = end;
                    size_idx += 1;
                }
                converter.finish().expect("finish");
                written += converter.take_output().len();
                black_box(written);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_style_adversarial(c: &mut Criterion) {
    let input = make_style_adversarial(512 * 1024);
    let policy = policy(ConverterConfig::fragment());
    c.bench_function("bench_style_adversarial", |b| {
        b.iter(|| {
            let out = sanitize(black_box(&input), &policy).expect("sanitize");
            black_box(out.len());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize_large,
    bench_sanitize_small,
    bench_sanitize_large_fragment,
    bench_sanitize_chunked,
    bench_style_adversarial
);
criterion_main!(benches);
