//! The single HTML page: essay form, photo upload and report view.

use axum::response::Html;

use crate::analysis::validation::{MAX_ESSAY_CHARS, MIN_ESSAY_CHARS};
use crate::ocr::image::{ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES};

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI 에세이 첨삭</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
  textarea { width: 100%; min-height: 16rem; font: inherit; }
  .field-error { color: #b00020; min-height: 1.2em; }
  .notice { background: #fdecea; padding: .75rem; border-radius: .5rem; display: none; }
  section.block { border: 1px solid #ddd; border-radius: .5rem; padding: 1rem; margin: 1rem 0; }
  blockquote { margin: .25rem 0 .5rem 1rem; color: #444; font-style: italic; }
</style>
</head>
<body>
<h1>AI 에세이 첨삭</h1>
<p>학생의 영어 에세이를 붙여넣거나 사진을 올리면 내용, 구조, 문법, 어휘에 대한 한국어 피드백을 받을 수 있습니다.</p>

<form id="essay-form">
  <textarea id="essay" name="essay" data-min-chars="{min_chars}" data-max-chars="{max_chars}"
    placeholder="{min_chars}자 이상 {max_chars}자 이하의 영어 에세이를 입력하세요."></textarea>
  <div id="essay-error" class="field-error"></div>
  <p>
    <button id="submit" type="submit">분석하기</button>
    <button id="load-example" type="button">예시 에세이 불러오기</button>
    <label>사진으로 입력: <input id="photo" type="file" accept="{accept}"></label>
  </p>
</form>

<div id="notice" class="notice"></div>
<div id="report"></div>

<script>
const MIN_CHARS = {min_chars};
const MAX_CHARS = {max_chars};
const MAX_IMAGE_BYTES = {max_image_bytes};
const ACCEPTED = "{accept}".split(",");

const form = document.getElementById("essay-form");
const essay = document.getElementById("essay");
const essayError = document.getElementById("essay-error");
const submit = document.getElementById("submit");
const photo = document.getElementById("photo");
const exampleButton = document.getElementById("load-example");
const notice = document.getElementById("notice");
const report = document.getElementById("report");

function setPending(pending) {
  submit.disabled = pending;
  photo.disabled = pending;
  exampleButton.disabled = pending;
  submit.textContent = pending ? "분석 중..." : "분석하기";
}

function showNotice(message) {
  notice.textContent = message || "";
  notice.style.display = message ? "block" : "none";
}

async function postJson(url, body) {
  const response = await fetch(url, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  return response.json();
}

function renderBlocks(blocks) {
  report.replaceChildren();
  for (const block of blocks) {
    const section = document.createElement("section");
    section.className = "block";
    const title = document.createElement("h2");
    title.textContent = block.title;
    const body = document.createElement("p");
    body.textContent = block.body;
    section.append(title, body);
    for (const [heading, findings] of [["강점", block.strengths], ["개선할 점", block.weaknesses]]) {
      if (!findings.length) continue;
      const h = document.createElement("h3");
      h.textContent = heading;
      const list = document.createElement("ul");
      for (const finding of findings) {
        const item = document.createElement("li");
        const quote = document.createElement("blockquote");
        item.textContent = finding.description;
        quote.textContent = '"' + finding.example + '"';
        item.append(quote);
        list.append(item);
      }
      section.append(h, list);
    }
    report.append(section);
  }
}

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  showNotice("");
  const length = [...essay.value.trim()].length;
  if (length < MIN_CHARS) { essayError.textContent = MIN_CHARS + "자 이상의 에세이를 입력해주세요."; return; }
  if (length > MAX_CHARS) { essayError.textContent = "에세이는 10,000자를 초과할 수 없습니다."; return; }
  essayError.textContent = "";

  setPending(true);
  try {
    const analysis = await postJson("/api/v1/analysis", { essay: essay.value });
    if (analysis.error) { showNotice(analysis.error); return; }
    const rendered = await postJson("/api/v1/analysis/render", analysis.result);
    if (rendered.error) { showNotice(rendered.error); return; }
    renderBlocks(rendered.result.blocks);
  } catch (err) {
    showNotice("알 수 없는 오류가 발생했습니다.");
  } finally {
    setPending(false);
  }
});

photo.addEventListener("change", () => {
  const file = photo.files[0];
  if (!file) return;
  showNotice("");
  if (!ACCEPTED.includes(file.type)) { showNotice("PNG, JPEG, WEBP 형식의 이미지만 지원합니다."); photo.value = ""; return; }
  if (file.size > MAX_IMAGE_BYTES) { showNotice("이미지 파일은 5MB를 초과할 수 없습니다."); photo.value = ""; return; }

  const reader = new FileReader();
  reader.onload = async () => {
    setPending(true);
    try {
      const ocr = await postJson("/api/v1/ocr", { photoDataUri: reader.result });
      if (ocr.error) { showNotice(ocr.error); return; }
      essay.value = ocr.text;
    } catch (err) {
      showNotice("알 수 없는 오류가 발생했습니다.");
    } finally {
      setPending(false);
      photo.value = "";
    }
  };
  reader.onerror = () => {
    showNotice("파일을 읽는 중 오류가 발생했습니다.");
    photo.value = "";
  };
  reader.readAsDataURL(file);
});

exampleButton.addEventListener("click", async () => {
  showNotice("");
  try {
    const response = await fetch("/api/v1/essays/example");
    if (!response.ok) throw new Error(response.statusText);
    const body = await response.json();
    essay.value = body.essay;
    essayError.textContent = "";
  } catch (err) {
    showNotice("예시 에세이를 불러오지 못했습니다.");
  }
});
</script>
</body>
</html>
"#;

/// Fills the page template with the server's own limits so the client-side
/// checks can never drift from the handlers.
pub fn render_page() -> String {
    PAGE_TEMPLATE
        .replace("{min_chars}", &MIN_ESSAY_CHARS.to_string())
        .replace("{max_chars}", &MAX_ESSAY_CHARS.to_string())
        .replace("{max_image_bytes}", &MAX_IMAGE_BYTES.to_string())
        .replace("{accept}", &ACCEPTED_IMAGE_TYPES.join(","))
}

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(render_page())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_uses_server_limits() {
        let page = render_page();
        assert!(page.contains(r#"data-min-chars="50" data-max-chars="10000""#));
        assert!(page.contains("const MIN_CHARS = 50;"));
        assert!(page.contains("const MAX_CHARS = 10000;"));
        assert!(page.contains("const MAX_IMAGE_BYTES = 5242880;"));
        assert!(page.contains(r#"accept="image/png,image/jpeg,image/webp""#));
        assert!(!page.contains("{min_chars}"));
        assert!(!page.contains("{accept}"));
    }

    #[test]
    fn test_textarea_has_no_native_length_limits() {
        // Browsers count these in UTF-16 units on the untrimmed value and
        // silently cut pasted text, so length is checked in script only.
        let page = render_page();
        assert!(!page.contains("minlength="));
        assert!(!page.contains("maxlength="));
        assert!(page.contains("[...essay.value.trim()].length"));
    }

    #[test]
    fn test_page_reports_read_and_load_failures() {
        let page = render_page();
        assert!(page.contains("reader.onerror"));
        assert!(page.contains("파일을 읽는 중 오류가 발생했습니다."));
        assert!(page.contains("예시 에세이를 불러오지 못했습니다."));
    }

    #[test]
    fn test_page_disables_controls_while_pending() {
        let page = render_page();
        assert!(page.contains("submit.disabled = pending;"));
        assert!(page.contains("photo.disabled = pending;"));
    }

    #[tokio::test]
    async fn test_index_handler_serves_html() {
        let Html(body) = handle_index().await;
        assert!(body.starts_with("<!doctype html>"));
        assert!(body.contains("/api/v1/essays/example"));
    }
}
