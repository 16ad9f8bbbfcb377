//! Embedded chat page. Plain HTML + JS, no build step.

/// The single-page chat UI served at `/`.
pub fn dashboard_html() -> &'static str {
    DASHBOARD_HTML
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Sith Holocron</title>
<style>
  :root { --bg: #0b0b0d; --panel: #16161a; --text: #e6e6e6; --muted: #8a8a93; --sith: #c1121f; }
  * { box-sizing: border-box; }
  body { margin: 0; background: var(--bg); color: var(--text); font-family: Georgia, serif; display: flex; }
  aside { width: 240px; min-height: 100vh; background: var(--panel); padding: 20px; border-right: 1px solid #2a2a30; }
  aside h2 { color: var(--sith); font-size: 18px; }
  aside p { color: var(--muted); font-size: 13px; }
  aside button { width: 100%; padding: 10px; background: transparent; color: var(--text); border: 1px solid var(--sith); cursor: pointer; }
  aside button:hover { background: var(--sith); }
  main { flex: 1; display: flex; flex-direction: column; height: 100vh; max-width: 900px; margin: 0 auto; }
  header { padding: 20px; text-align: center; }
  header h1 { margin: 0; color: var(--sith); letter-spacing: 3px; text-transform: uppercase; }
  #messages { flex: 1; overflow-y: auto; padding: 0 20px; }
  .msg { margin: 12px 0; padding: 12px 16px; border-radius: 6px; white-space: pre-wrap; line-height: 1.5; }
  .msg.user { background: #1f1f25; margin-left: 15%; }
  .msg.assistant { background: #1a0c0e; border-left: 3px solid var(--sith); margin-right: 15%; }
  .msg .who { display: block; font-size: 12px; color: var(--muted); margin-bottom: 4px; }
  form { display: flex; gap: 8px; padding: 20px; }
  input { flex: 1; padding: 12px; background: var(--panel); color: var(--text); border: 1px solid #2a2a30; font-size: 15px; }
  form button { padding: 12px 20px; background: var(--sith); color: white; border: none; cursor: pointer; }
  form button:disabled, input:disabled { opacity: 0.5; }
</style>
</head>
<body>
<aside>
  <h2>Holocron</h2>
  <p id="model">Connecting…</p>
  <button id="clear" type="button">Clear chat history</button>
</aside>
<main>
  <header><h1>Sith Holocron</h1></header>
  <div id="messages"></div>
  <form id="chat">
    <input id="prompt" autocomplete="off" placeholder="What knowledge do you seek?">
    <button type="submit">Ask</button>
  </form>
</main>
<script>
const api = '/api/v1';
const box = document.getElementById('messages');
const form = document.getElementById('chat');
const input = document.getElementById('prompt');
let sessionId = sessionStorage.getItem('holocron-session');

function render(messages) {
  box.innerHTML = '';
  for (const m of messages) {
    const div = document.createElement('div');
    div.className = 'msg ' + m.role;
    const who = document.createElement('span');
    who.className = 'who';
    who.textContent = m.role === 'user' ? 'Seeker' : 'Holocron';
    div.appendChild(who);
    div.appendChild(document.createTextNode(m.content));
    box.appendChild(div);
  }
  box.scrollTop = box.scrollHeight;
}

async function newSession() {
  const res = await fetch(api + '/sessions', { method: 'POST' });
  const data = await res.json();
  sessionId = data.session_id;
  sessionStorage.setItem('holocron-session', sessionId);
  render(data.messages);
}

async function restore() {
  if (sessionId) {
    const res = await fetch(api + '/sessions/' + sessionId + '/messages');
    if (res.ok) { render((await res.json()).messages); return; }
  }
  await newSession();
}

function busy(on) {
  input.disabled = on;
  form.querySelector('button').disabled = on;
}

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const message = input.value.trim();
  if (!message) return;
  input.value = '';
  const pending = document.createElement('div');
  pending.className = 'msg user';
  pending.textContent = message;
  box.appendChild(pending);
  busy(true);
  try {
    const res = await fetch(api + '/sessions/' + sessionId + '/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ message }),
    });
    if (res.status === 404) { await newSession(); return; }
    const data = await res.json();
    if (data.messages) render(data.messages);
  } catch (err) {
    const div = document.createElement('div');
    div.className = 'msg assistant';
    div.textContent = 'Error: ' + err;
    box.appendChild(div);
  } finally {
    busy(false);
    input.focus();
  }
});

document.getElementById('clear').addEventListener('click', async () => {
  const res = await fetch(api + '/sessions/' + sessionId + '/clear', { method: 'POST' });
  if (res.ok) render((await res.json()).messages); else await newSession();
});

fetch(api + '/info').then(r => r.json()).then(info => {
  document.getElementById('model').textContent = info.provider + ' · ' + info.model +
    (info.llm_online ? '' : ' · offline');
}).catch(() => {});

restore();
</script>
</body>
</html>
"#;
