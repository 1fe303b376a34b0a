pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Eclipse Finder</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
form { display: flex; gap: .5rem; flex-wrap: wrap; }
input { padding: .4rem; }
pre { background: #f4f4f4; padding: 1rem; white-space: pre-wrap; }
</style>
</head>
<body>
<h1>Eclipse Finder</h1>
<p>Next solar and lunar eclipses visible from a city, region, country or postal code.</p>
<form id="f">
  <input name="location" placeholder="Austin, TX, USA or 78701" list="regions" required>
  <input name="date" type="date">
  <button>Find eclipses</button>
</form>
<datalist id="regions"></datalist>
<pre id="out"></pre>
<script>
fetch('/api/regions').then(r => r.json()).then(d => {
  const list = document.getElementById('regions');
  for (const name of [...d.countries, ...d.macro_regions]) {
    const o = document.createElement('option'); o.value = name; list.appendChild(o);
  }
});
document.getElementById('f').addEventListener('submit', async e => {
  e.preventDefault();
  const q = new URLSearchParams(new FormData(e.target));
  const r = await fetch('/api/eclipses?' + q);
  document.getElementById('out').textContent = JSON.stringify(await r.json(), null, 2);
});
</script>
</body>
</html>
"#;
